use tokio_postgres::GenericClient;
use tokio_postgres::Transaction;

use crate::core::types::Head;
use crate::store::StoreError;

/// Retrieve head of last persisted batch.
pub(super) async fn get(client: &impl GenericClient) -> Result<Option<Head>, StoreError> {
    tracing::debug!("reading last header");
    let qry = "
        select height
            , timestamp
            , hash
        from sw.headers;";
    Ok(client.query_opt(qry, &[]).await?.map(|row| Head {
        height: row.get(0),
        timestamp: row.get(1),
        hash: row.get(2),
    }))
}

pub(super) async fn upsert(pgtx: &Transaction<'_>, head: &Head) -> Result<(), StoreError> {
    tracing::trace!("set head {head:?}");
    let stmt = "
        insert into sw.headers (singleton, height, timestamp, hash)
        values (1, $1, $2, $3)
        on conflict (singleton) do update
        set height = EXCLUDED.height
            , timestamp = EXCLUDED.timestamp
            , hash = EXCLUDED.hash
        ;";
    pgtx.execute(stmt, &[&head.height, &head.timestamp, &head.hash])
        .await?;
    Ok(())
}
