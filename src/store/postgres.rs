//! Postgres backed entity store.
//!
//! Each batch of blocks is persisted within a single database transaction
//! ([`PgTx`]), committed together with the new head.
mod accounts;
mod chain_states;
mod evm_contracts;
mod headers;
mod identities;
mod identity_subs;
mod staking_rewards;
mod transfers;

use async_trait::async_trait;
use std::fmt::Display;
use std::str::FromStr;
use tokio_postgres::error::SqlState;
use tokio_postgres::NoTls;
use tokio_postgres::Transaction;

use super::types::AccountRecord;
use super::types::ChainStateRecord;
use super::types::EvmContractRecord;
use super::types::IdentityRecord;
use super::types::IdentitySubRecord;
use super::types::StakingRewardRecord;
use super::types::TransferRecord;
use super::EntityStore;
use super::StoreError;
use crate::config::PostgresConfig;
use crate::core::types::AccountId;
use crate::core::types::EvmAddress;
use crate::core::types::Head;
use crate::core::types::Height;
use crate::utils::Schema;

const SCHEMA_NAME: &str = "sw";

pub struct PgStore {
    client: tokio_postgres::Client,
    head: Head,
}

impl PgStore {
    pub async fn new(pgconf: &PostgresConfig) -> Result<Self, StoreError> {
        tracing::debug!("initializing new store");
        let (mut client, connection) =
            tokio_postgres::connect(&pgconf.connection_uri, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("connection error: {}", e);
            }
        });

        let schema = Schema::new(SCHEMA_NAME, include_str!("schema.sql"));
        schema.init(&mut client).await?;

        let head = headers::get(&client).await?.unwrap_or(Head::initial());
        tracing::debug!("head: {:?}", &head);

        Ok(Self { client, head })
    }

    pub fn get_head(&self) -> &Head {
        &self.head
    }

    /// Opens a transaction for a new batch.
    pub async fn begin(&mut self) -> Result<PgTx<'_>, StoreError> {
        let tx = self.client.transaction().await?;
        Ok(PgTx { tx })
    }

    /// Updates the cached head after a successful commit.
    pub fn set_head(&mut self, head: Head) {
        self.head = head;
    }
}

/// Entity store operating within a database transaction.
pub struct PgTx<'a> {
    tx: Transaction<'a>,
}

impl<'a> PgTx<'a> {
    /// Persists the new head and commits.
    pub async fn commit(self, head: &Head) -> Result<(), StoreError> {
        headers::upsert(&self.tx, head).await?;
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl<'a> EntityStore for PgTx<'a> {
    async fn get_account(&mut self, id: &str) -> Result<Option<AccountRecord>, StoreError> {
        accounts::get(&self.tx, id).await
    }

    async fn insert_account(&mut self, record: &AccountRecord) -> Result<(), StoreError> {
        accounts::insert(&self.tx, record).await
    }

    async fn save_account(&mut self, record: &AccountRecord) -> Result<(), StoreError> {
        accounts::update(&self.tx, record).await
    }

    async fn upsert_balances(&mut self, records: &[AccountRecord]) -> Result<(), StoreError> {
        accounts::upsert_balances(&self.tx, records).await
    }

    async fn delete_accounts(
        &mut self,
        ids: &[AccountId],
        height: Height,
    ) -> Result<usize, StoreError> {
        accounts::delete_many(&self.tx, ids, height).await
    }

    async fn count_holders(&mut self) -> Result<i64, StoreError> {
        accounts::count_holders(&self.tx).await
    }

    async fn insert_transfer(&mut self, record: &TransferRecord) -> Result<(), StoreError> {
        transfers::insert(&self.tx, record).await
    }

    async fn insert_staking_reward(
        &mut self,
        record: &StakingRewardRecord,
    ) -> Result<(), StoreError> {
        staking_rewards::insert(&self.tx, record).await
    }

    async fn get_identity(&mut self, id: &str) -> Result<Option<IdentityRecord>, StoreError> {
        identities::get(&self.tx, id).await
    }

    async fn insert_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError> {
        identities::insert(&self.tx, record).await
    }

    async fn save_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError> {
        identities::update(&self.tx, record).await
    }

    async fn get_identity_sub(
        &mut self,
        id: &str,
    ) -> Result<Option<IdentitySubRecord>, StoreError> {
        identity_subs::get(&self.tx, id).await
    }

    async fn get_identity_subs(
        &mut self,
        super_id: &str,
    ) -> Result<Vec<IdentitySubRecord>, StoreError> {
        identity_subs::get_by_super(&self.tx, super_id).await
    }

    async fn insert_identity_sub(
        &mut self,
        record: &IdentitySubRecord,
    ) -> Result<(), StoreError> {
        identity_subs::insert(&self.tx, record).await
    }

    async fn save_identity_sub(&mut self, record: &IdentitySubRecord) -> Result<(), StoreError> {
        identity_subs::update(&self.tx, record).await
    }

    async fn get_evm_contract(
        &mut self,
        id: &EvmAddress,
    ) -> Result<Option<EvmContractRecord>, StoreError> {
        evm_contracts::get(&self.tx, id).await
    }

    async fn insert_evm_contract(
        &mut self,
        record: &EvmContractRecord,
    ) -> Result<(), StoreError> {
        evm_contracts::insert(&self.tx, record).await
    }

    async fn last_chain_state(&mut self) -> Result<Option<ChainStateRecord>, StoreError> {
        chain_states::get_last(&self.tx).await
    }

    async fn insert_chain_state(&mut self, record: &ChainStateRecord) -> Result<(), StoreError> {
        chain_states::insert(&self.tx, record).await
    }
}

/// Maps constraint violations of a write on `entity` `key`.
fn write_error(err: tokio_postgres::Error, entity: &'static str, key: &str) -> StoreError {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => StoreError::Conflict {
            entity,
            key: key.to_owned(),
        },
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => StoreError::MissingReference {
            entity,
            key: key.to_owned(),
        },
        _ => StoreError::Postgres(err),
    }
}

/// Decimal text of an amount.
///
/// Numeric columns are bound as `$n::text::numeric` and read back as
/// `col::text`, keeping the full width of 256-bit token amounts.
fn to_numeric(value: impl Display) -> String {
    value.to_string()
}

fn from_numeric<T: FromStr>(text: String) -> Result<T, StoreError> {
    text.parse().map_err(|_| StoreError::OutOfRange(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Amount;
    use crate::core::types::Balance;

    #[test]
    fn numeric_text_keeps_full_width() {
        let n: Balance = 100_000_000_000 * 10u128.pow(18);
        assert_eq!(to_numeric(n), "100000000000000000000000000000");
        assert_eq!(from_numeric::<Balance>(to_numeric(n)).unwrap(), n);
        assert_eq!(from_numeric::<Balance>(to_numeric(u128::MAX)).unwrap(), u128::MAX);
        let max = to_numeric(Amount::MAX);
        assert_eq!(
            max,
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(from_numeric::<Amount>(max).unwrap(), Amount::MAX);
    }

    #[test]
    fn numeric_text_out_of_range() {
        assert!(from_numeric::<Balance>("-1".to_owned()).is_err());
        assert!(from_numeric::<Balance>(to_numeric(Amount::MAX)).is_err());
        assert!(from_numeric::<Balance>("1.5".to_owned()).is_err());
    }
}
