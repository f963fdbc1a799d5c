//! Batched balance reconciliation.
//!
//! Balance changes are not tracked event by event. Touched accounts are
//! collected instead and their balances read from storage in one go,
//! at batch and day boundaries.
use std::collections::BTreeSet;

use super::ProcessError;
use crate::config::IngestFilter;
use crate::core::oracle::RuntimeOracle;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Block;
use crate::core::types::Height;
use crate::core::types::Item;
use crate::decoding::balances::AccountAmount;
use crate::decoding::balances::BALANCE_SET;
use crate::decoding::balances::DEPOSIT;
use crate::decoding::balances::DUST_LOST;
use crate::decoding::balances::ENDOWED;
use crate::decoding::balances::RESERVED;
use crate::decoding::balances::TRANSFER;
use crate::decoding::balances::UNRESERVED;
use crate::decoding::balances::WITHDRAW;
use crate::decoding::system::AccountBalance;
use crate::decoding::system::ACCOUNT;
use crate::decoding::DecodeError;
use crate::decoding::ShapeError;
use crate::store::types::AccountRecord;
use crate::store::EntityStore;

/// Outcome of a bulk balance lookup.
#[derive(Debug, Default, PartialEq)]
pub struct BalancePlan {
    /// Accounts with a positive total.
    pub upserts: Vec<AccountRecord>,
    /// Accounts with nothing left.
    pub deletions: Vec<AccountId>,
}

/// Splits looked up `balances` of accounts `ids` into upserts and deletions.
///
/// Absent balances count as zero.
pub fn plan(ids: &[AccountId], balances: &[Option<AccountBalance>], height: Height) -> BalancePlan {
    let mut plan = BalancePlan::default();
    for (id, balance) in ids.iter().zip(balances) {
        let balance = balance.unwrap_or_default();
        if balance.total() > 0 {
            plan.upserts.push(AccountRecord::with_balance(
                id,
                balance.free,
                balance.reserved,
                height,
            ));
        } else {
            plan.deletions.push(id.clone());
        }
    }
    plan
}

#[derive(Debug, Default)]
pub struct BalanceReconciler {
    touched: BTreeSet<AccountId>,
}

impl BalanceReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.touched.len()
    }

    /// Collects accounts whose balance may have changed in `block`.
    ///
    /// That is signers of calls (fees) and accounts named by balance events.
    pub fn scan(
        &mut self,
        block: &Block,
        codec: &AddressCodec,
        filter: &IngestFilter,
    ) -> Result<(), DecodeError> {
        let runtime = &block.runtime;
        for item in block.items.iter().filter(|item| filter.admits(item)) {
            match item {
                Item::Call(call) => {
                    if let Some(origin) = &call.origin {
                        let id = codec
                            .encode_hex(origin)
                            .map_err(|e| ShapeError::from(e).at(ACCOUNT.name))?;
                        self.touched.insert(id);
                    }
                }
                Item::Event(event) => {
                    let args = &event.args;
                    match event.name.as_str() {
                        "Balances.Transfer" => {
                            let transfer = TRANSFER.decode(runtime, args, codec)?;
                            self.touched.insert(transfer.from);
                            self.touched.insert(transfer.to);
                        }
                        "Balances.Endowed" => self.touch(ENDOWED.decode(runtime, args, codec)?),
                        "Balances.Deposit" => self.touch(DEPOSIT.decode(runtime, args, codec)?),
                        "Balances.Withdraw" => self.touch(WITHDRAW.decode(runtime, args, codec)?),
                        "Balances.Reserved" => self.touch(RESERVED.decode(runtime, args, codec)?),
                        "Balances.Unreserved" => {
                            self.touch(UNRESERVED.decode(runtime, args, codec)?)
                        }
                        "Balances.BalanceSet" => {
                            self.touch(BALANCE_SET.decode(runtime, args, codec)?)
                        }
                        "Balances.DustLost" => self.touch(DUST_LOST.decode(runtime, args, codec)?),
                        _ => (),
                    }
                }
            }
        }
        Ok(())
    }

    fn touch(&mut self, event: AccountAmount) {
        self.touched.insert(event.account);
    }

    /// Reads balances of all touched accounts at `block` and persists them.
    ///
    /// Returns the resulting plan.
    pub async fn flush(
        &mut self,
        store: &mut dyn EntityStore,
        oracle: &dyn RuntimeOracle,
        block: &Block,
        codec: &AddressCodec,
    ) -> Result<BalancePlan, ProcessError> {
        if self.touched.is_empty() {
            return Ok(BalancePlan::default());
        }
        let ids: Vec<AccountId> = std::mem::take(&mut self.touched).into_iter().collect();
        let keys = ids
            .iter()
            .map(|id| codec.decode(id).map(|key| format!("0x{}", hex::encode(key))))
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| ShapeError::from(e).at(ACCOUNT.name))?;
        let values = oracle.storage(&block.header, ACCOUNT.name, &keys).await?;
        if values.len() != ids.len() {
            return Err(ProcessError::StorageMismatch {
                item: ACCOUNT.name,
                expected: ids.len(),
                actual: values.len(),
            });
        }
        let balances = values
            .iter()
            .map(|value| {
                value
                    .as_ref()
                    .map(|v| ACCOUNT.decode(&block.runtime, v, codec))
                    .transpose()
            })
            .collect::<Result<Vec<Option<AccountBalance>>, DecodeError>>()?;

        let height = block.header.height;
        let plan = plan(&ids, &balances, height);
        store.upsert_balances(&plan.upserts).await?;
        let deleted = store.delete_accounts(&plan.deletions, height).await?;
        tracing::debug!(
            "reconciled {} balances at height {}, {} accounts emptied, {} deleted",
            ids.len(),
            height,
            plan.deletions.len(),
            deleted
        );
        Ok(plan)
    }
}
