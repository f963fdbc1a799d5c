//! Entity store.
//!
//! All entity reads and writes go through [`EntityStore`], implemented by a
//! Postgres transaction in production and an in-memory store in tests.
#[cfg(feature = "test-utilities")]
pub mod memory;
pub mod postgres;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::AccountId;
use crate::core::types::EvmAddress;
use crate::core::types::Height;
use types::AccountRecord;
use types::ChainStateRecord;
use types::EvmContractRecord;
use types::IdentityRecord;
use types::IdentitySubRecord;
use types::StakingRewardRecord;
use types::TransferRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} `{key}` already exists")]
    Conflict { entity: &'static str, key: String },
    #[error("{entity} `{key}` references a missing row")]
    MissingReference { entity: &'static str, key: String },
    #[error("value out of range for numeric column: {0}")]
    OutOfRange(String),
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),
}

#[async_trait]
pub trait EntityStore: Send {
    async fn get_account(&mut self, id: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Fails with a conflict if the account exists already.
    async fn insert_account(&mut self, record: &AccountRecord) -> Result<(), StoreError>;

    async fn save_account(&mut self, record: &AccountRecord) -> Result<(), StoreError>;

    /// Sets balances of given accounts, creating missing ones.
    async fn upsert_balances(&mut self, records: &[AccountRecord]) -> Result<(), StoreError>;

    /// Deletes given accounts.
    ///
    /// Accounts still referenced by other entities are kept, with zeroed
    /// balances, as of `height`. Returns the number of deleted rows.
    async fn delete_accounts(
        &mut self,
        ids: &[AccountId],
        height: Height,
    ) -> Result<usize, StoreError>;

    /// Number of accounts with a positive total balance.
    async fn count_holders(&mut self) -> Result<i64, StoreError>;

    async fn insert_transfer(&mut self, record: &TransferRecord) -> Result<(), StoreError>;

    async fn insert_staking_reward(
        &mut self,
        record: &StakingRewardRecord,
    ) -> Result<(), StoreError>;

    async fn get_identity(&mut self, id: &str) -> Result<Option<IdentityRecord>, StoreError>;

    async fn insert_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError>;

    async fn save_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError>;

    async fn get_identity_sub(&mut self, id: &str)
        -> Result<Option<IdentitySubRecord>, StoreError>;

    /// Subs linked to identity `super_id`, ordered by id.
    async fn get_identity_subs(
        &mut self,
        super_id: &str,
    ) -> Result<Vec<IdentitySubRecord>, StoreError>;

    async fn insert_identity_sub(&mut self, record: &IdentitySubRecord)
        -> Result<(), StoreError>;

    async fn save_identity_sub(&mut self, record: &IdentitySubRecord) -> Result<(), StoreError>;

    async fn get_evm_contract(
        &mut self,
        id: &EvmAddress,
    ) -> Result<Option<EvmContractRecord>, StoreError>;

    async fn insert_evm_contract(&mut self, record: &EvmContractRecord)
        -> Result<(), StoreError>;

    /// Snapshot with the most recent timestamp, if any.
    async fn last_chain_state(&mut self) -> Result<Option<ChainStateRecord>, StoreError>;

    async fn insert_chain_state(&mut self, record: &ChainStateRecord) -> Result<(), StoreError>;
}
