//! Identity events and calls.
//!
//! Identity details are only carried by calls, so events look up their
//! triggering call when they need them.
use super::Scope;
use crate::actions::Action;
use crate::actions::ActionContext;
use crate::actions::Mutation;
use crate::actions::Query;
use crate::core::types::Call;
use crate::core::types::Event;
use crate::core::types::Judgement;
use crate::decoding::identity::ADD_SUB_CALL;
use crate::decoding::identity::IDENTITY_CLEARED;
use crate::decoding::identity::IDENTITY_KILLED;
use crate::decoding::identity::IDENTITY_SET;
use crate::decoding::identity::JUDGEMENT_GIVEN;
use crate::decoding::identity::PROVIDE_JUDGEMENT_CALL;
use crate::decoding::identity::RENAME_SUB_CALL;
use crate::decoding::identity::SET_IDENTITY_CALL;
use crate::decoding::identity::SET_SUBS_CALL;
use crate::decoding::identity::SUB_IDENTITY_ADDED;
use crate::decoding::identity::SUB_IDENTITY_REMOVED;
use crate::decoding::identity::SUB_IDENTITY_REVOKED;
use crate::decoding::DecodeError;

pub(super) fn identity_set(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let runtime = &scope.block.runtime;
    let who = IDENTITY_SET.decode(runtime, &event.args, scope.codec)?;
    let mut actions = vec![
        Action::ensure_account(ctx, &who),
        Action::direct(ctx, Mutation::EnsureIdentity(who.clone())),
    ];
    match scope.call_of(event, SET_IDENTITY_CALL.name) {
        Some(call) => {
            let info = SET_IDENTITY_CALL.decode(runtime, &call.args, scope.codec)?;
            actions.push(Action::direct(ctx, Mutation::SetIdentity { id: who, info }));
        }
        None => tracing::debug!("no set_identity call for event {}", event.id),
    }
    Ok(actions)
}

pub(super) fn identity_cleared(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let who = IDENTITY_CLEARED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![
        Action::deferred(ctx, Query::RemoveSubsOf(who.clone())),
        Action::direct(ctx, Mutation::ClearIdentity(who)),
    ])
}

pub(super) fn identity_killed(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let who = IDENTITY_KILLED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![
        Action::deferred(ctx, Query::RemoveSubsOf(who.clone())),
        Action::direct(ctx, Mutation::KillIdentity(who)),
    ])
}

pub(super) fn judgement_given(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let runtime = &scope.block.runtime;
    let target = JUDGEMENT_GIVEN.decode(runtime, &event.args, scope.codec)?;
    let judgement = match scope.call_of(event, PROVIDE_JUDGEMENT_CALL.name) {
        Some(call) => {
            PROVIDE_JUDGEMENT_CALL
                .decode(runtime, &call.args, scope.codec)?
                .judgement
        }
        None => Judgement::Unknown,
    };
    Ok(vec![Action::direct(
        ctx,
        Mutation::GiveJudgement {
            id: target,
            judgement,
        },
    )])
}

pub(super) fn sub_added(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let runtime = &scope.block.runtime;
    let link = SUB_IDENTITY_ADDED.decode(runtime, &event.args, scope.codec)?;
    let name = match scope.call_of(event, ADD_SUB_CALL.name) {
        Some(call) => ADD_SUB_CALL.decode(runtime, &call.args, scope.codec)?.name,
        None => None,
    };
    Ok(vec![
        Action::ensure_account(ctx, &link.main),
        Action::direct(ctx, Mutation::EnsureIdentity(link.main.clone())),
        Action::ensure_account(ctx, &link.sub),
        Action::direct(ctx, Mutation::EnsureIdentitySub(link.sub.clone())),
        Action::direct(
            ctx,
            Mutation::AddIdentitySub {
                sub: link.sub,
                super_id: link.main,
                name,
            },
        ),
    ])
}

pub(super) fn sub_removed(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let link = SUB_IDENTITY_REMOVED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![Action::deferred(ctx, Query::RemoveSub(link.sub))])
}

pub(super) fn sub_revoked(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let link = SUB_IDENTITY_REVOKED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![Action::deferred(ctx, Query::RemoveSub(link.sub))])
}

/// Replaces all subs of the origin.
pub(super) fn set_subs(
    scope: &Scope,
    ctx: &ActionContext,
    call: &Call,
) -> Result<Vec<Action>, DecodeError> {
    let Some(main) = scope.origin(call, SET_SUBS_CALL.name)? else {
        return Ok(vec![]);
    };
    let entries = SET_SUBS_CALL.decode(&scope.block.runtime, &call.args, scope.codec)?;
    let mut actions = vec![Action::deferred(ctx, Query::RemoveSubsOf(main.clone()))];
    for entry in entries {
        actions.push(Action::ensure_account(ctx, &entry.sub));
        actions.push(Action::direct(
            ctx,
            Mutation::EnsureIdentitySub(entry.sub.clone()),
        ));
        actions.push(Action::direct(
            ctx,
            Mutation::AddIdentitySub {
                sub: entry.sub,
                super_id: main.clone(),
                name: entry.name,
            },
        ));
    }
    Ok(actions)
}

pub(super) fn rename_sub(
    scope: &Scope,
    ctx: &ActionContext,
    call: &Call,
) -> Result<Vec<Action>, DecodeError> {
    let entry = RENAME_SUB_CALL.decode(&scope.block.runtime, &call.args, scope.codec)?;
    Ok(vec![Action::direct(
        ctx,
        Mutation::RenameIdentitySub {
            sub: entry.sub,
            name: entry.name,
        },
    )])
}

#[cfg(test)]
mod tests {
    use super::super::block_actions;
    use crate::actions::ActionKind;
    use crate::actions::Mutation;
    use crate::actions::Query;
    use crate::config::IngestFilter;
    use crate::core::ss58::AddressCodec;
    use crate::core::types::Block;
    use crate::core::types::Judgement;
    use crate::decoding::testutils;
    use serde_json::json;
    use std::sync::Arc;

    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const BOB_HEX: &str = "0x8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";
    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    fn kinds(block: &Block) -> Vec<ActionKind> {
        let codec = AddressCodec::new(42);
        block_actions(block, &codec, &IngestFilter::default())
            .unwrap()
            .into_iter()
            .map(|a| a.kind)
            .collect()
    }

    fn v2() -> Block {
        Block::dummy()
            .runtime(Arc::new(testutils::runtime(2, 1)))
            .with_extrinsic(Some(ALICE_HEX))
    }

    #[test]
    fn identity_set_takes_info_from_call() {
        let block = v2()
            .with_call(
                "Identity.set_identity",
                json!({"info": {
                    "display": {"__kind": "Raw5", "value": "0x416c696365"},
                    "legal": {"__kind": "None"},
                    "web": {"__kind": "None"},
                    "matrix": {"__kind": "None"},
                    "email": {"__kind": "None"},
                    "twitter": {"__kind": "None"},
                    "image": {"__kind": "None"},
                }}),
                true,
            )
            .with_event_of_last_call("Identity.IdentitySet", json!({"who": ALICE_HEX}));
        let kinds = kinds(&block);
        assert_eq!(kinds.len(), 3);
        assert_eq!(
            kinds[1],
            ActionKind::Direct(Mutation::EnsureIdentity(ALICE.to_owned()))
        );
        match &kinds[2] {
            ActionKind::Direct(Mutation::SetIdentity { id, info }) => {
                assert_eq!(id, ALICE);
                assert_eq!(info.display.as_deref(), Some("Alice"));
                assert_eq!(info.legal, None);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn killed_identity_drops_subs_first() {
        let block = v2().with_event(
            "Identity.IdentityKilled",
            json!({"who": ALICE_HEX, "deposit": "10"}),
        );
        assert_eq!(
            kinds(&block),
            vec![
                ActionKind::Deferred(Query::RemoveSubsOf(ALICE.to_owned())),
                ActionKind::Direct(Mutation::KillIdentity(ALICE.to_owned())),
            ]
        );
    }

    #[test]
    fn judgement_without_call_is_unknown() {
        let block = v2().with_event(
            "Identity.JudgementGiven",
            json!({"target": ALICE_HEX, "registrarIndex": 0}),
        );
        assert_eq!(
            kinds(&block),
            vec![ActionKind::Direct(Mutation::GiveJudgement {
                id: ALICE.to_owned(),
                judgement: Judgement::Unknown
            })]
        );
    }

    #[test]
    fn sub_added_ensures_both_sides() {
        let block = v2()
            .with_call(
                "Identity.add_sub",
                json!({"sub": {"__kind": "Id", "value": BOB_HEX}, "data": {"__kind": "Raw3", "value": "0x626f62"}}),
                true,
            )
            .with_event_of_last_call(
                "Identity.SubIdentityAdded",
                json!({"sub": BOB_HEX, "main": ALICE_HEX, "deposit": "1"}),
            );
        let kinds = kinds(&block);
        assert_eq!(kinds.len(), 5);
        assert_eq!(
            kinds[4],
            ActionKind::Direct(Mutation::AddIdentitySub {
                sub: BOB.to_owned(),
                super_id: ALICE.to_owned(),
                name: Some("bob".to_owned()),
            })
        );
    }

    #[test]
    fn sub_removal_is_deferred() {
        let block = v2().with_event(
            "Identity.SubIdentityRevoked",
            json!({"sub": BOB_HEX, "main": ALICE_HEX, "deposit": "1"}),
        );
        assert_eq!(
            kinds(&block),
            vec![ActionKind::Deferred(Query::RemoveSub(BOB.to_owned()))]
        );
    }

    #[test]
    fn set_subs_replaces_subs_of_origin() {
        let block = v2().with_call(
            "Identity.set_subs",
            json!({"subs": [[BOB_HEX, {"__kind": "None"}]]}),
            true,
        );
        let kinds = kinds(&block);
        assert_eq!(kinds.len(), 4);
        assert_eq!(
            kinds[0],
            ActionKind::Deferred(Query::RemoveSubsOf(ALICE.to_owned()))
        );
        assert_eq!(
            kinds[3],
            ActionKind::Direct(Mutation::AddIdentitySub {
                sub: BOB.to_owned(),
                super_id: ALICE.to_owned(),
                name: None,
            })
        );
    }
}
