//! Ordered execution of a block's actions.
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

use super::Action;
use super::ActionError;
use crate::core::types::ExtrinsicHash;
use crate::core::types::Height;
use crate::evm::introspection::TokenIntrospector;
use crate::store::EntityStore;

/// What actions get to touch while executing.
pub struct Env<'a> {
    pub store: &'a mut dyn EntityStore,
    pub introspector: &'a dyn TokenIntrospector,
    pub token_call_timeout: Duration,
}

#[derive(Error, Debug)]
#[error("action failed at height {height} (extrinsic {extrinsic_hash:?})")]
pub struct PipelineError {
    pub height: Height,
    pub extrinsic_hash: Option<ExtrinsicHash>,
    #[source]
    pub source: ActionError,
}

/// Executes `actions` in order.
///
/// Actions a deferred query expands into run right after it, ahead of
/// anything queued later. Stops at the first failure.
pub async fn process(env: &mut Env<'_>, actions: Vec<Action>) -> Result<usize, PipelineError> {
    let mut queue: VecDeque<Action> = actions.into();
    let mut executed = 0;
    while let Some(mut action) = queue.pop_front() {
        let expanded = action.execute(env).await.map_err(|source| PipelineError {
            height: action.ctx.height,
            extrinsic_hash: action.ctx.extrinsic_hash.clone(),
            source,
        })?;
        executed += 1;
        for next in expanded.into_iter().rev() {
            queue.push_front(next);
        }
    }
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionContext;
    use crate::actions::Mutation;
    use crate::actions::NewReward;
    use crate::actions::NewTransfer;
    use crate::actions::Query;
    use crate::core::types::Amount;
    use crate::core::types::AssetKind;
    use crate::decoding::identity::IdentityInfo;
    use crate::evm::introspection::NoIntrospection;
    use crate::store::memory::MemoryStore;
    use crate::store::types::AccountRecord;
    use crate::store::StoreError;
    use pretty_assertions::assert_eq;

    fn ctx() -> ActionContext {
        ActionContext {
            height: 10,
            timestamp: 1_700_000_000_000,
            block_hash: "0xb10c".to_owned(),
            extrinsic_hash: Some("0xe8".to_owned()),
            extrinsic_index: Some(1),
        }
    }

    async fn run(store: &mut MemoryStore, actions: Vec<Action>) -> Result<usize, PipelineError> {
        let introspector = NoIntrospection;
        let mut env = Env {
            store,
            introspector: &introspector,
            token_call_timeout: Duration::from_millis(10),
        };
        process(&mut env, actions).await
    }

    #[tokio::test]
    async fn ensured_accounts_precede_transfer() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::ensure_account(&ctx, "bob"),
            Action::direct(
                &ctx,
                Mutation::InsertTransfer(NewTransfer::native("t1", "alice", "bob", 5, true)),
            ),
        ];
        assert_eq!(run(&mut store, actions).await.unwrap(), 3);
        let transfer = &store.transfers["t1"];
        assert_eq!(transfer.from_id, "alice");
        assert_eq!(transfer.to_id, "bob");
        assert_eq!(transfer.height, 10);
        assert_eq!(transfer.extrinsic_hash.as_deref(), Some("0xe8"));
    }

    #[tokio::test]
    async fn transfer_without_account_fails() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::direct(
                &ctx,
                Mutation::InsertTransfer(NewTransfer::native("t1", "alice", "bob", 5, true)),
            ),
        ];
        let err = run(&mut store, actions).await.unwrap_err();
        assert_eq!(err.height, 10);
        assert!(matches!(err.source, ActionError::MissingAccount(id) if id == "bob"));
        assert!(store.transfers.is_empty());
    }

    #[tokio::test]
    async fn ensure_account_is_idempotent() {
        let mut store = MemoryStore::with_accounts(vec![AccountRecord::with_balance(
            "alice", 100, 0, 1,
        )]);
        let ctx = ctx();
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::ensure_account(&ctx, "alice"),
        ];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.accounts.len(), 1);
        assert_eq!(store.accounts["alice"].free, 100);
        assert_eq!(store.accounts["alice"].updated_at, 1);
    }

    #[tokio::test]
    async fn ensure_account_links_evm_address() {
        let mut store = MemoryStore::with_accounts(vec![AccountRecord::new("alice", 1)]);
        let ctx = ctx();
        let actions = vec![Action::direct(
            &ctx,
            Mutation::EnsureAccount {
                id: "alice".to_owned(),
                evm_address: Some("0xabc".to_owned()),
            },
        )];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.accounts["alice"].evm_address.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn duplicate_transfer_is_a_conflict() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let transfer = NewTransfer::native("t1", "alice", "alice", 1, true);
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::direct(&ctx, Mutation::InsertTransfer(transfer.clone())),
            Action::direct(&ctx, Mutation::InsertTransfer(transfer)),
        ];
        let err = run(&mut store, actions).await.unwrap_err();
        assert!(matches!(
            err.source,
            ActionError::Store(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn deferred_removal_runs_before_later_actions() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let setup = vec![
            Action::ensure_account(&ctx, "main"),
            Action::ensure_account(&ctx, "s1"),
            Action::ensure_account(&ctx, "s2"),
            Action::direct(&ctx, Mutation::EnsureIdentity("main".to_owned())),
            Action::direct(&ctx, Mutation::EnsureIdentitySub("s1".to_owned())),
            Action::direct(&ctx, Mutation::EnsureIdentitySub("s2".to_owned())),
            Action::direct(
                &ctx,
                Mutation::AddIdentitySub {
                    sub: "s1".to_owned(),
                    super_id: "main".to_owned(),
                    name: Some("one".to_owned()),
                },
            ),
            Action::direct(
                &ctx,
                Mutation::AddIdentitySub {
                    sub: "s2".to_owned(),
                    super_id: "main".to_owned(),
                    name: Some("two".to_owned()),
                },
            ),
        ];
        run(&mut store, setup).await.unwrap();
        assert_eq!(store.identity_subs["s1"].super_id.as_deref(), Some("main"));

        // Removing all subs then re-adding s2 must leave s2 linked.
        let actions = vec![
            Action::deferred(&ctx, Query::RemoveSubsOf("main".to_owned())),
            Action::direct(
                &ctx,
                Mutation::AddIdentitySub {
                    sub: "s2".to_owned(),
                    super_id: "main".to_owned(),
                    name: Some("again".to_owned()),
                },
            ),
        ];
        // 1 query + 2 expanded removals + 1 add
        assert_eq!(run(&mut store, actions).await.unwrap(), 4);
        assert_eq!(store.identity_subs["s1"].super_id, None);
        assert_eq!(store.identity_subs["s1"].name, None);
        assert_eq!(store.identity_subs["s2"].super_id.as_deref(), Some("main"));
        assert_eq!(store.identity_subs["s2"].name.as_deref(), Some("again"));

        // Ensuring a removed sub later on leaves its row as is.
        let removed = store.identity_subs["s1"].clone();
        let later = ActionContext {
            height: 20,
            ..ctx.clone()
        };
        let actions = vec![Action::direct(
            &later,
            Mutation::EnsureIdentitySub("s1".to_owned()),
        )];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.identity_subs["s1"], removed);
        assert_eq!(store.identity_subs["s1"].super_id, None);
        assert_eq!(store.identity_subs["s1"].name, None);
        assert_eq!(store.identity_subs["s1"].updated_at, 10);
    }

    #[tokio::test]
    async fn wide_token_amounts_are_kept() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        // 100 billion tokens at 18 decimals, past what 96-bit decimals hold
        let large = Amount::from(100_000_000_000u128 * 10u128.pow(18));
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::ensure_account(&ctx, "bob"),
            Action::direct(
                &ctx,
                Mutation::InsertTransfer(NewTransfer {
                    id: "t1".to_owned(),
                    from: "alice".to_owned(),
                    to: "bob".to_owned(),
                    amount: large,
                    success: true,
                    asset: AssetKind::Erc20,
                    contract: Some("0x1111111111111111111111111111111111111111".to_owned()),
                    token_id: None,
                }),
            ),
            Action::direct(
                &ctx,
                Mutation::InsertTransfer(NewTransfer {
                    amount: Amount::MAX,
                    ..NewTransfer::native("t2", "bob", "alice", 0, true)
                }),
            ),
        ];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.transfers["t1"].amount, large);
        assert_eq!(
            store.transfers["t1"].amount.to_string(),
            "100000000000000000000000000000"
        );
        assert_eq!(store.transfers["t2"].amount, Amount::MAX);
    }

    #[tokio::test]
    async fn late_eras_are_kept() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::direct(
                &ctx,
                Mutation::InsertStakingReward(NewReward {
                    id: "r1".to_owned(),
                    account: "alice".to_owned(),
                    amount: 1,
                    era: Some(u32::MAX),
                    validator: None,
                }),
            ),
        ];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.staking_rewards["r1"].era, Some(4_294_967_295));
    }

    #[tokio::test]
    async fn deferred_query_on_missing_rows_expands_to_nothing() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let actions = vec![
            Action::deferred(&ctx, Query::RemoveSub("nobody".to_owned())),
            Action::deferred(&ctx, Query::RemoveSubsOf("nobody".to_owned())),
        ];
        assert_eq!(run(&mut store, actions).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn identity_lifecycle() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let info = IdentityInfo {
            display: Some("Alice".to_owned()),
            ..IdentityInfo::default()
        };
        let actions = vec![
            Action::ensure_account(&ctx, "alice"),
            Action::direct(&ctx, Mutation::EnsureIdentity("alice".to_owned())),
            Action::direct(
                &ctx,
                Mutation::SetIdentity {
                    id: "alice".to_owned(),
                    info,
                },
            ),
        ];
        run(&mut store, actions).await.unwrap();
        assert_eq!(store.identities["alice"].display.as_deref(), Some("Alice"));

        let actions = vec![Action::direct(&ctx, Mutation::KillIdentity("alice".to_owned()))];
        run(&mut store, actions).await.unwrap();
        let identity = &store.identities["alice"];
        assert!(identity.is_killed);
        assert_eq!(identity.display, None);
    }

    #[tokio::test]
    async fn identity_of_unknown_account_is_skipped() {
        let mut store = MemoryStore::new();
        let ctx = ctx();
        let actions = vec![Action::direct(&ctx, Mutation::EnsureIdentity("ghost".to_owned()))];
        run(&mut store, actions).await.unwrap();
        assert!(store.identities.is_empty());
    }

    #[tokio::test]
    #[should_panic(expected = "action executed twice")]
    async fn actions_run_once() {
        let mut store = MemoryStore::new();
        let introspector = NoIntrospection;
        let mut env = Env {
            store: &mut store,
            introspector: &introspector,
            token_call_timeout: Duration::from_millis(10),
        };
        let mut action = Action::ensure_account(&ctx(), "alice");
        action.execute(&mut env).await.unwrap();
        let _ = action.execute(&mut env).await;
    }
}
