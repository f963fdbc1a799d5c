use postgres_from_row::FromRow;
use tokio_postgres::GenericClient;
use tokio_postgres::Transaction;

use super::write_error;
use crate::store::types::IdentitySubRecord;
use crate::store::StoreError;

pub(super) async fn get(
    client: &impl GenericClient,
    id: &str,
) -> Result<Option<IdentitySubRecord>, StoreError> {
    tracing::trace!("get {id}");
    let qry = "
        select id
            , super_id
            , name
            , updated_at
        from sw.identity_subs
        where id = $1;";
    match client.query_opt(qry, &[&id]).await? {
        Some(row) => Ok(Some(IdentitySubRecord::try_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Subs of identity `super_id`.
pub(super) async fn get_by_super(
    client: &impl GenericClient,
    super_id: &str,
) -> Result<Vec<IdentitySubRecord>, StoreError> {
    tracing::trace!("get subs of {super_id}");
    let qry = "
        select id
            , super_id
            , name
            , updated_at
        from sw.identity_subs
        where super_id = $1
        order by id;";
    client
        .query(qry, &[&super_id])
        .await?
        .iter()
        .map(|row| IdentitySubRecord::try_from_row(row).map_err(StoreError::from))
        .collect()
}

pub(super) async fn insert(
    pgtx: &Transaction<'_>,
    record: &IdentitySubRecord,
) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.identity_subs (id, super_id, name, updated_at)
        values ($1, $2, $3, $4);";
    pgtx.execute(
        stmt,
        &[&record.id, &record.super_id, &record.name, &record.updated_at],
    )
    .await
    .map_err(|e| write_error(e, "identity sub", &record.id))?;
    Ok(())
}

pub(super) async fn update(
    pgtx: &Transaction<'_>,
    record: &IdentitySubRecord,
) -> Result<(), StoreError> {
    tracing::trace!("update {record:?}");
    let stmt = "
        update sw.identity_subs
        set super_id = $2
            , name = $3
            , updated_at = $4
        where id = $1;";
    pgtx.execute(
        stmt,
        &[&record.id, &record.super_id, &record.name, &record.updated_at],
    )
    .await
    .map_err(|e| write_error(e, "identity sub", &record.id))?;
    Ok(())
}
