use tokio_postgres::Transaction;

use super::to_numeric;
use super::write_error;
use crate::store::types::TransferRecord;
use crate::store::StoreError;

pub(super) async fn insert(pgtx: &Transaction<'_>, record: &TransferRecord) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.transfers (
            id,
            block_hash,
            height,
            timestamp,
            extrinsic_hash,
            from_id,
            to_id,
            amount,
            success,
            asset,
            contract,
            token_id
        )
        values ($1, $2, $3, $4, $5, $6, $7, $8::text::numeric, $9, $10, $11, $12);";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.block_hash,
            &record.height,
            &record.timestamp,
            &record.extrinsic_hash,
            &record.from_id,
            &record.to_id,
            &to_numeric(record.amount),
            &record.success,
            &record.asset,
            &record.contract,
            &record.token_id,
        ],
    )
    .await
    .map_err(|e| write_error(e, "transfer", &record.id))?;
    Ok(())
}
