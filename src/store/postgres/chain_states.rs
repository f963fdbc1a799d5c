use tokio_postgres::GenericClient;
use tokio_postgres::Transaction;

use super::from_numeric;
use super::to_numeric;
use super::write_error;
use crate::store::types::ChainStateRecord;
use crate::store::StoreError;

/// Returns snapshot with latest timestamp, if any.
pub(super) async fn get_last(
    client: &impl GenericClient,
) -> Result<Option<ChainStateRecord>, StoreError> {
    tracing::trace!("get last");
    let qry = "
        select block_hash
            , height
            , timestamp
            , total_issuance::text
            , holders
        from sw.chain_states
        order by timestamp desc
        limit 1;";
    match client.query_opt(qry, &[]).await? {
        Some(row) => Ok(Some(ChainStateRecord {
            block_hash: row.get(0),
            height: row.get(1),
            timestamp: row.get(2),
            total_issuance: from_numeric(row.get(3))?,
            holders: row.get(4),
        })),
        None => Ok(None),
    }
}

pub(super) async fn insert(
    pgtx: &Transaction<'_>,
    record: &ChainStateRecord,
) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.chain_states (block_hash, height, timestamp, total_issuance, holders)
        values ($1, $2, $3, $4::text::numeric, $5);";
    pgtx.execute(
        stmt,
        &[
            &record.block_hash,
            &record.height,
            &record.timestamp,
            &to_numeric(record.total_issuance),
            &record.holders,
        ],
    )
    .await
    .map_err(|e| write_error(e, "chain state", &record.block_hash))?;
    Ok(())
}
