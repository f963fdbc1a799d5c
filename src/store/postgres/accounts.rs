use tokio_postgres::types::Type;
use tokio_postgres::GenericClient;
use tokio_postgres::Row;
use tokio_postgres::Transaction;

use super::from_numeric;
use super::to_numeric;
use super::write_error;
use crate::core::types::AccountId;
use crate::core::types::Height;
use crate::store::types::AccountRecord;
use crate::store::StoreError;

fn from_row(row: &Row) -> Result<AccountRecord, StoreError> {
    Ok(AccountRecord {
        id: row.get(0),
        evm_address: row.get(1),
        free: from_numeric(row.get(2))?,
        reserved: from_numeric(row.get(3))?,
        total: from_numeric(row.get(4))?,
        updated_at: row.get(5),
    })
}

pub(super) async fn get(
    client: &impl GenericClient,
    id: &str,
) -> Result<Option<AccountRecord>, StoreError> {
    tracing::trace!("get {id}");
    let qry = "
        select id
            , evm_address
            , free::text
            , reserved::text
            , total::text
            , updated_at
        from sw.accounts
        where id = $1;";
    client
        .query_opt(qry, &[&id])
        .await?
        .map(|row| from_row(&row))
        .transpose()
}

pub(super) async fn insert(pgtx: &Transaction<'_>, record: &AccountRecord) -> Result<(), StoreError> {
    tracing::trace!("insert {record:?}");
    let stmt = "
        insert into sw.accounts (id, evm_address, free, reserved, total, updated_at)
        values ($1, $2, $3::text::numeric, $4::text::numeric, $5::text::numeric, $6);";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.evm_address,
            &to_numeric(record.free),
            &to_numeric(record.reserved),
            &to_numeric(record.total),
            &record.updated_at,
        ],
    )
    .await
    .map_err(|e| write_error(e, "account", &record.id))?;
    Ok(())
}

pub(super) async fn update(pgtx: &Transaction<'_>, record: &AccountRecord) -> Result<(), StoreError> {
    tracing::trace!("update {record:?}");
    let stmt = "
        update sw.accounts
        set evm_address = $2
            , free = $3::text::numeric
            , reserved = $4::text::numeric
            , total = $5::text::numeric
            , updated_at = $6
        where id = $1;";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.evm_address,
            &to_numeric(record.free),
            &to_numeric(record.reserved),
            &to_numeric(record.total),
            &record.updated_at,
        ],
    )
    .await?;
    Ok(())
}

/// Upsert balances of given accounts, leaving evm links untouched.
pub(super) async fn upsert_balances(
    pgtx: &Transaction<'_>,
    records: &[AccountRecord],
) -> Result<(), StoreError> {
    tracing::trace!("upsert {} balances", records.len());
    let sql = "
        insert into sw.accounts (id, evm_address, free, reserved, total, updated_at)
        values ($1, null, $2::text::numeric, $3::text::numeric, $4::text::numeric, $5)
        on conflict (id) do update
        set free = EXCLUDED.free
            , reserved = EXCLUDED.reserved
            , total = EXCLUDED.total
            , updated_at = EXCLUDED.updated_at
        ;";
    let stmt = pgtx
        .prepare_typed(
            sql,
            &[Type::TEXT, Type::TEXT, Type::TEXT, Type::TEXT, Type::INT4],
        )
        .await?;
    for r in records {
        pgtx.execute(
            &stmt,
            &[
                &r.id,
                &to_numeric(r.free),
                &to_numeric(r.reserved),
                &to_numeric(r.total),
                &r.updated_at,
            ],
        )
        .await?;
    }
    Ok(())
}

/// Delete unreferenced accounts and zero the others.
///
/// Returns number of deleted rows.
pub(super) async fn delete_many(
    pgtx: &Transaction<'_>,
    ids: &[AccountId],
    height: Height,
) -> Result<usize, StoreError> {
    tracing::trace!("delete {} accounts", ids.len());
    let referenced = "
        exists (select 1 from sw.transfers t where t.from_id = a.id or t.to_id = a.id)
        or exists (select 1 from sw.staking_rewards r where r.account_id = a.id)
        or exists (select 1 from sw.identities i where i.id = a.id)
        or exists (select 1 from sw.identity_subs s where s.id = a.id)
        or exists (select 1 from sw.evm_contracts c where c.deployer_id = a.id)";
    let zero = format!(
        "
        update sw.accounts a
        set free = 0
            , reserved = 0
            , total = 0
            , updated_at = $2
        where a.id = any($1)
            and ({referenced});"
    );
    pgtx.execute(&zero, &[&ids, &height]).await?;
    let delete = format!(
        "
        delete from sw.accounts a
        where a.id = any($1)
            and not ({referenced});"
    );
    let deleted = pgtx.execute(&delete, &[&ids]).await?;
    Ok(deleted as usize)
}

pub(super) async fn count_holders(client: &impl GenericClient) -> Result<i64, StoreError> {
    let qry = "select count(*) from sw.accounts where total > 0;";
    Ok(client.query_one(qry, &[]).await?.get(0))
}
