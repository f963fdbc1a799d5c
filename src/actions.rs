//! Mutation intents against the entity store.
//!
//! Handlers turn block items into [`Action`]s without touching the store.
//! Actions are then executed in order by the [`pipeline`]. Deferred actions
//! carry a [`Query`] resolved against the store when they run, expanding
//! into further actions executed in their place.
mod accounts;
mod contracts;
mod identities;
pub mod pipeline;
mod rewards;
mod transfers;

use thiserror::Error;

use crate::core::types::AccountId;
use crate::core::types::Amount;
use crate::core::types::AssetKind;
use crate::core::types::Balance;
use crate::core::types::BlockHash;
use crate::core::types::EvmAddress;
use crate::core::types::ExtrinsicHash;
use crate::core::types::Height;
use crate::core::types::Judgement;
use crate::core::types::Timestamp;
use crate::decoding::identity::IdentityInfo;
use crate::store::types::IdentitySubRecord;
use crate::store::StoreError;
use pipeline::Env;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("account `{0}` does not exist")]
    MissingAccount(AccountId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where an action comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    pub height: Height,
    pub timestamp: Timestamp,
    pub block_hash: BlockHash,
    pub extrinsic_hash: Option<ExtrinsicHash>,
    pub extrinsic_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub id: String,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
    pub success: bool,
    pub asset: AssetKind,
    pub contract: Option<EvmAddress>,
    pub token_id: Option<String>,
}

impl NewTransfer {
    pub fn native(id: &str, from: &str, to: &str, amount: Balance, success: bool) -> Self {
        Self {
            id: id.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            amount: Amount::from(amount),
            success,
            asset: AssetKind::Native,
            contract: None,
            token_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReward {
    pub id: String,
    pub account: AccountId,
    pub amount: Balance,
    pub era: Option<u32>,
    pub validator: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContract {
    pub address: EvmAddress,
    pub deployer: AccountId,
    pub transaction_hash: String,
    pub bytecode: Vec<u8>,
}

/// A single reconciliation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Create account if absent, linking `evm_address` if given.
    EnsureAccount {
        id: AccountId,
        evm_address: Option<EvmAddress>,
    },
    InsertTransfer(NewTransfer),
    InsertStakingReward(NewReward),
    EnsureIdentity(AccountId),
    SetIdentity {
        id: AccountId,
        info: IdentityInfo,
    },
    ClearIdentity(AccountId),
    KillIdentity(AccountId),
    GiveJudgement {
        id: AccountId,
        judgement: Judgement,
    },
    EnsureIdentitySub(AccountId),
    AddIdentitySub {
        sub: AccountId,
        super_id: AccountId,
        name: Option<String>,
    },
    RenameIdentitySub {
        sub: AccountId,
        name: Option<String>,
    },
    /// Unlinks a resolved sub row.
    RemoveIdentitySub(IdentitySubRecord),
    CreateEvmContract(NewContract),
}

/// Store state a deferred action depends on.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Removal of a sub, once its current row is known.
    RemoveSub(AccountId),
    /// Removal of all current subs of an identity.
    RemoveSubsOf(AccountId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Direct(Mutation),
    Deferred(Query),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub ctx: ActionContext,
    pub kind: ActionKind,
    executed: bool,
}

impl Action {
    pub fn direct(ctx: &ActionContext, mutation: Mutation) -> Self {
        Self {
            ctx: ctx.clone(),
            kind: ActionKind::Direct(mutation),
            executed: false,
        }
    }

    pub fn deferred(ctx: &ActionContext, query: Query) -> Self {
        Self {
            ctx: ctx.clone(),
            kind: ActionKind::Deferred(query),
            executed: false,
        }
    }

    pub fn ensure_account(ctx: &ActionContext, id: &str) -> Self {
        Self::direct(
            ctx,
            Mutation::EnsureAccount {
                id: id.to_owned(),
                evm_address: None,
            },
        )
    }

    /// Runs the action, once.
    ///
    /// Returns actions a deferred query expanded into, to be run next.
    ///
    /// Panics if the action ran already.
    pub async fn execute(&mut self, env: &mut Env<'_>) -> Result<Vec<Action>, ActionError> {
        assert!(!self.executed, "action executed twice: {:?}", self.kind);
        self.executed = true;
        let ctx = &self.ctx;
        match &self.kind {
            ActionKind::Direct(mutation) => {
                apply(env, ctx, mutation).await?;
                Ok(vec![])
            }
            ActionKind::Deferred(query) => resolve(env, ctx, query).await,
        }
    }
}

async fn apply(
    env: &mut Env<'_>,
    ctx: &ActionContext,
    mutation: &Mutation,
) -> Result<(), ActionError> {
    tracing::trace!("{mutation:?}");
    match mutation {
        Mutation::EnsureAccount { id, evm_address } => {
            accounts::ensure(env.store, ctx, id, evm_address.as_deref()).await
        }
        Mutation::InsertTransfer(transfer) => transfers::insert(env.store, ctx, transfer).await,
        Mutation::InsertStakingReward(reward) => rewards::insert(env.store, ctx, reward).await,
        Mutation::EnsureIdentity(id) => identities::ensure(env.store, ctx, id).await,
        Mutation::SetIdentity { id, info } => identities::set(env.store, ctx, id, info).await,
        Mutation::ClearIdentity(id) => identities::clear(env.store, ctx, id).await,
        Mutation::KillIdentity(id) => identities::kill(env.store, ctx, id).await,
        Mutation::GiveJudgement { id, judgement } => {
            identities::judge(env.store, ctx, id, *judgement).await
        }
        Mutation::EnsureIdentitySub(id) => identities::ensure_sub(env.store, ctx, id).await,
        Mutation::AddIdentitySub {
            sub,
            super_id,
            name,
        } => identities::add_sub(env.store, ctx, sub, super_id, name.clone()).await,
        Mutation::RenameIdentitySub { sub, name } => {
            identities::rename_sub(env.store, ctx, sub, name.clone()).await
        }
        Mutation::RemoveIdentitySub(sub) => identities::remove_sub(env.store, ctx, sub).await,
        Mutation::CreateEvmContract(contract) => contracts::create(env, ctx, contract).await,
    }
}

async fn resolve(
    env: &mut Env<'_>,
    ctx: &ActionContext,
    query: &Query,
) -> Result<Vec<Action>, ActionError> {
    tracing::trace!("{query:?}");
    let subs: Vec<IdentitySubRecord> = match query {
        Query::RemoveSub(id) => env.store.get_identity_sub(id).await?.into_iter().collect(),
        Query::RemoveSubsOf(id) => env.store.get_identity_subs(id).await?,
    };
    Ok(subs
        .into_iter()
        .map(|sub| Action::direct(ctx, Mutation::RemoveIdentitySub(sub)))
        .collect())
}
