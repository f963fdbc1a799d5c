//! In-memory entity store, mirroring the constraints of the Postgres schema.
use async_trait::async_trait;
use std::collections::BTreeMap;

use super::types::AccountRecord;
use super::types::ChainStateRecord;
use super::types::EvmContractRecord;
use super::types::IdentityRecord;
use super::types::IdentitySubRecord;
use super::types::StakingRewardRecord;
use super::types::TransferRecord;
use super::EntityStore;
use super::StoreError;
use crate::core::types::AccountId;
use crate::core::types::EvmAddress;
use crate::core::types::Height;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub accounts: BTreeMap<AccountId, AccountRecord>,
    pub transfers: BTreeMap<String, TransferRecord>,
    pub staking_rewards: BTreeMap<String, StakingRewardRecord>,
    pub identities: BTreeMap<AccountId, IdentityRecord>,
    pub identity_subs: BTreeMap<AccountId, IdentitySubRecord>,
    pub evm_contracts: BTreeMap<EvmAddress, EvmContractRecord>,
    pub chain_states: Vec<ChainStateRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with given accounts.
    pub fn with_accounts(accounts: Vec<AccountRecord>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            ..Self::default()
        }
    }

    fn require_account(&self, entity: &'static str, id: &str) -> Result<(), StoreError> {
        match self.accounts.contains_key(id) {
            true => Ok(()),
            false => Err(StoreError::MissingReference {
                entity,
                key: id.to_owned(),
            }),
        }
    }

    fn is_referenced(&self, id: &str) -> bool {
        self.transfers
            .values()
            .any(|t| t.from_id == id || t.to_id == id)
            || self.staking_rewards.values().any(|r| r.account_id == id)
            || self.identities.contains_key(id)
            || self.identity_subs.contains_key(id)
            || self.evm_contracts.values().any(|c| c.deployer_id == id)
    }
}

fn conflict(entity: &'static str, key: &str) -> StoreError {
    StoreError::Conflict {
        entity,
        key: key.to_owned(),
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_account(&mut self, id: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.accounts.get(id).cloned())
    }

    async fn insert_account(&mut self, record: &AccountRecord) -> Result<(), StoreError> {
        if self.accounts.contains_key(&record.id) {
            return Err(conflict("account", &record.id));
        }
        self.accounts.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn save_account(&mut self, record: &AccountRecord) -> Result<(), StoreError> {
        self.accounts.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn upsert_balances(&mut self, records: &[AccountRecord]) -> Result<(), StoreError> {
        for r in records {
            let account = self
                .accounts
                .entry(r.id.clone())
                .or_insert_with(|| r.clone());
            account.free = r.free;
            account.reserved = r.reserved;
            account.total = r.total;
            account.updated_at = r.updated_at;
        }
        Ok(())
    }

    async fn delete_accounts(
        &mut self,
        ids: &[AccountId],
        height: Height,
    ) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for id in ids {
            if self.is_referenced(id) {
                if let Some(account) = self.accounts.get_mut(id) {
                    account.free = 0;
                    account.reserved = 0;
                    account.total = 0;
                    account.updated_at = height;
                }
            } else if self.accounts.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn count_holders(&mut self) -> Result<i64, StoreError> {
        Ok(self.accounts.values().filter(|a| a.total > 0).count() as i64)
    }

    async fn insert_transfer(&mut self, record: &TransferRecord) -> Result<(), StoreError> {
        if self.transfers.contains_key(&record.id) {
            return Err(conflict("transfer", &record.id));
        }
        self.require_account("transfer", &record.from_id)?;
        self.require_account("transfer", &record.to_id)?;
        self.transfers.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn insert_staking_reward(
        &mut self,
        record: &StakingRewardRecord,
    ) -> Result<(), StoreError> {
        if self.staking_rewards.contains_key(&record.id) {
            return Err(conflict("staking reward", &record.id));
        }
        self.require_account("staking reward", &record.account_id)?;
        self.staking_rewards.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_identity(&mut self, id: &str) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.identities.get(id).cloned())
    }

    async fn insert_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError> {
        if self.identities.contains_key(&record.id) {
            return Err(conflict("identity", &record.id));
        }
        self.require_account("identity", &record.id)?;
        self.identities.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn save_identity(&mut self, record: &IdentityRecord) -> Result<(), StoreError> {
        self.identities.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_identity_sub(
        &mut self,
        id: &str,
    ) -> Result<Option<IdentitySubRecord>, StoreError> {
        Ok(self.identity_subs.get(id).cloned())
    }

    async fn get_identity_subs(
        &mut self,
        super_id: &str,
    ) -> Result<Vec<IdentitySubRecord>, StoreError> {
        Ok(self
            .identity_subs
            .values()
            .filter(|s| s.super_id.as_deref() == Some(super_id))
            .cloned()
            .collect())
    }

    async fn insert_identity_sub(
        &mut self,
        record: &IdentitySubRecord,
    ) -> Result<(), StoreError> {
        if self.identity_subs.contains_key(&record.id) {
            return Err(conflict("identity sub", &record.id));
        }
        self.require_account("identity sub", &record.id)?;
        self.identity_subs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn save_identity_sub(&mut self, record: &IdentitySubRecord) -> Result<(), StoreError> {
        if let Some(super_id) = &record.super_id {
            if !self.identities.contains_key(super_id) {
                return Err(StoreError::MissingReference {
                    entity: "identity sub",
                    key: record.id.clone(),
                });
            }
        }
        self.identity_subs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_evm_contract(
        &mut self,
        id: &EvmAddress,
    ) -> Result<Option<EvmContractRecord>, StoreError> {
        Ok(self.evm_contracts.get(id).cloned())
    }

    async fn insert_evm_contract(
        &mut self,
        record: &EvmContractRecord,
    ) -> Result<(), StoreError> {
        if self.evm_contracts.contains_key(&record.id) {
            return Err(conflict("evm contract", &record.id));
        }
        self.require_account("evm contract", &record.deployer_id)?;
        self.evm_contracts.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn last_chain_state(&mut self) -> Result<Option<ChainStateRecord>, StoreError> {
        Ok(self
            .chain_states
            .iter()
            .max_by_key(|cs| cs.timestamp)
            .cloned())
    }

    async fn insert_chain_state(&mut self, record: &ChainStateRecord) -> Result<(), StoreError> {
        if self
            .chain_states
            .iter()
            .any(|cs| cs.timestamp == record.timestamp || cs.block_hash == record.block_hash)
        {
            return Err(conflict("chain state", &record.block_hash));
        }
        self.chain_states.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn referenced_accounts_are_zeroed_not_deleted() {
        let mut store = MemoryStore::with_accounts(vec![
            AccountRecord::with_balance("a", 10, 0, 1),
            AccountRecord::with_balance("b", 10, 0, 1),
        ]);
        store
            .insert_identity(&IdentityRecord::new("a", 1))
            .await
            .unwrap();
        let deleted = store
            .delete_accounts(&["a".to_owned(), "b".to_owned()], 5)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(!store.accounts.contains_key("b"));
        let a = &store.accounts["a"];
        assert_eq!(a.total, 0);
        assert_eq!(a.updated_at, 5);
    }

    #[tokio::test]
    async fn insert_conflicts() {
        let mut store = MemoryStore::new();
        let account = AccountRecord::new("a", 1);
        store.insert_account(&account).await.unwrap();
        assert!(matches!(
            store.insert_account(&account).await,
            Err(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn holders_have_positive_totals() {
        let mut store = MemoryStore::with_accounts(vec![
            AccountRecord::with_balance("a", 10, 0, 1),
            AccountRecord::with_balance("b", 0, 3, 1),
            AccountRecord::new("c", 1),
        ]);
        assert_eq!(store.count_holders().await.unwrap(), 2);
    }
}
