use tokio_postgres::Transaction;

use super::to_numeric;
use super::write_error;
use crate::store::types::StakingRewardRecord;
use crate::store::StoreError;

pub(super) async fn insert(
    pgtx: &Transaction<'_>,
    record: &StakingRewardRecord,
) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.staking_rewards (
            id,
            block_hash,
            height,
            timestamp,
            extrinsic_hash,
            account_id,
            amount,
            era,
            validator
        )
        values ($1, $2, $3, $4, $5, $6, $7::text::numeric, $8, $9);";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.block_hash,
            &record.height,
            &record.timestamp,
            &record.extrinsic_hash,
            &record.account_id,
            &to_numeric(record.amount),
            &record.era,
            &record.validator,
        ],
    )
    .await
    .map_err(|e| write_error(e, "staking reward", &record.id))?;
    Ok(())
}
