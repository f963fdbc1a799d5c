use postgres_from_row::FromRow;
use tokio_postgres::GenericClient;
use tokio_postgres::Transaction;

use super::write_error;
use crate::store::types::IdentityRecord;
use crate::store::StoreError;

pub(super) async fn get(
    client: &impl GenericClient,
    id: &str,
) -> Result<Option<IdentityRecord>, StoreError> {
    tracing::trace!("get {id}");
    let qry = "
        select id
            , display
            , legal
            , web
            , matrix
            , email
            , twitter
            , image
            , judgement
            , is_killed
            , created_at
            , updated_at
        from sw.identities
        where id = $1;";
    match client.query_opt(qry, &[&id]).await? {
        Some(row) => Ok(Some(IdentityRecord::try_from_row(&row)?)),
        None => Ok(None),
    }
}

pub(super) async fn insert(pgtx: &Transaction<'_>, record: &IdentityRecord) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.identities (
            id,
            display,
            legal,
            web,
            matrix,
            email,
            twitter,
            image,
            judgement,
            is_killed,
            created_at,
            updated_at
        )
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12);";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.display,
            &record.legal,
            &record.web,
            &record.matrix,
            &record.email,
            &record.twitter,
            &record.image,
            &record.judgement,
            &record.is_killed,
            &record.created_at,
            &record.updated_at,
        ],
    )
    .await
    .map_err(|e| write_error(e, "identity", &record.id))?;
    Ok(())
}

pub(super) async fn update(pgtx: &Transaction<'_>, record: &IdentityRecord) -> Result<(), StoreError> {
    tracing::trace!("update {record:?}");
    let stmt = "
        update sw.identities
        set display = $2
            , legal = $3
            , web = $4
            , matrix = $5
            , email = $6
            , twitter = $7
            , image = $8
            , judgement = $9
            , is_killed = $10
            , updated_at = $11
        where id = $1;";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.display,
            &record.legal,
            &record.web,
            &record.matrix,
            &record.email,
            &record.twitter,
            &record.image,
            &record.judgement,
            &record.is_killed,
            &record.updated_at,
        ],
    )
    .await?;
    Ok(())
}
