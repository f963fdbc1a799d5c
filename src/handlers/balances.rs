use super::Scope;
use crate::actions::Action;
use crate::actions::ActionContext;
use crate::actions::Mutation;
use crate::actions::NewTransfer;
use crate::core::types::Call;
use crate::core::types::Event;
use crate::decoding::balances::ENDOWED;
use crate::decoding::balances::TRANSFER;
use crate::decoding::balances::TRANSFER_CALL;
use crate::decoding::balances::TRANSFER_KEEP_ALIVE_CALL;
use crate::decoding::DecodeError;

pub(super) fn transfer(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let transfer = TRANSFER.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![
        Action::ensure_account(ctx, &transfer.from),
        Action::ensure_account(ctx, &transfer.to),
        Action::direct(
            ctx,
            Mutation::InsertTransfer(NewTransfer::native(
                &event.id,
                &transfer.from,
                &transfer.to,
                transfer.amount,
                true,
            )),
        ),
    ])
}

pub(super) fn endowed(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let endowed = ENDOWED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(vec![Action::ensure_account(ctx, &endowed.account)])
}

/// Failed transfers emit no events, so get recorded from the call.
pub(super) fn failed_transfer(
    scope: &Scope,
    ctx: &ActionContext,
    call: &Call,
) -> Result<Vec<Action>, DecodeError> {
    let item = match call.name.as_str() {
        "Balances.transfer_keep_alive" => &TRANSFER_KEEP_ALIVE_CALL,
        _ => &TRANSFER_CALL,
    };
    let Some(from) = scope.origin(call, item.name)? else {
        tracing::debug!("unsigned transfer call {}, skipping", call.id);
        return Ok(vec![]);
    };
    let args = item.decode(&scope.block.runtime, &call.args, scope.codec)?;
    Ok(vec![
        Action::ensure_account(ctx, &from),
        Action::ensure_account(ctx, &args.dest),
        Action::direct(
            ctx,
            Mutation::InsertTransfer(NewTransfer::native(
                &call.id, &from, &args.dest, args.value, false,
            )),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::block_actions;
    use crate::actions::ActionKind;
    use crate::actions::Mutation;
    use crate::config::IngestFilter;
    use crate::core::ss58::AddressCodec;
    use crate::core::types::Amount;
    use crate::core::types::Block;
    use crate::decoding::testutils;
    use serde_json::json;
    use std::sync::Arc;

    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const BOB_HEX: &str = "0x8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";
    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    #[test]
    fn transfer_ensures_both_accounts_first() {
        let block = Block::dummy()
            .runtime(Arc::new(testutils::runtime(2, 1)))
            .with_event(
                "Balances.Transfer",
                json!({"from": ALICE_HEX, "to": BOB_HEX, "amount": "50"}),
            );
        let codec = AddressCodec::new(42);
        let actions = block_actions(&block, &codec, &IngestFilter::default()).unwrap();
        let kinds: Vec<ActionKind> = actions.into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(
            kinds[0],
            ActionKind::Direct(Mutation::EnsureAccount {
                id: ALICE.to_owned(),
                evm_address: None
            })
        );
        assert_eq!(
            kinds[1],
            ActionKind::Direct(Mutation::EnsureAccount {
                id: BOB.to_owned(),
                evm_address: None
            })
        );
        match &kinds[2] {
            ActionKind::Direct(Mutation::InsertTransfer(t)) => {
                assert_eq!(t.from, ALICE);
                assert_eq!(t.to, BOB);
                assert_eq!(t.amount, Amount::from(50u64));
                assert!(t.success);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn failed_transfer_call_is_recorded_unsuccessful() {
        let block = Block::dummy()
            .runtime(Arc::new(testutils::runtime(1, 0)))
            .with_extrinsic(Some(ALICE_HEX))
            .with_call(
                "Balances.transfer",
                json!({"dest": BOB_HEX, "value": "7"}),
                false,
            );
        let codec = AddressCodec::new(42);
        let actions = block_actions(&block, &codec, &IngestFilter::default()).unwrap();
        assert_eq!(actions.len(), 3);
        match &actions[2].kind {
            ActionKind::Direct(Mutation::InsertTransfer(t)) => {
                assert_eq!(t.id, "0000000001-000000-call");
                assert_eq!(t.from, ALICE);
                assert_eq!(t.to, BOB);
                assert!(!t.success);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn successful_transfer_call_is_left_to_its_event() {
        let block = Block::dummy()
            .runtime(Arc::new(testutils::runtime(1, 0)))
            .with_extrinsic(Some(ALICE_HEX))
            .with_call(
                "Balances.transfer",
                json!({"dest": BOB_HEX, "value": "7"}),
                true,
            );
        let codec = AddressCodec::new(42);
        assert!(block_actions(&block, &codec, &IngestFilter::default())
            .unwrap()
            .is_empty());
    }
}
