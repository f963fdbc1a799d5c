use super::Scope;
use crate::actions::Action;
use crate::actions::ActionContext;
use crate::actions::Mutation;
use crate::actions::NewReward;
use crate::core::types::Event;
use crate::decoding::staking::Reward;
use crate::decoding::staking::DAPPS_REWARD;
use crate::decoding::staking::REWARDED;
use crate::decoding::DecodeError;

pub(super) fn rewarded(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let reward = REWARDED.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(reward_actions(ctx, event, reward))
}

pub(super) fn dapps_reward(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let reward = DAPPS_REWARD.decode(&scope.block.runtime, &event.args, scope.codec)?;
    Ok(reward_actions(ctx, event, reward))
}

fn reward_actions(ctx: &ActionContext, event: &Event, reward: Reward) -> Vec<Action> {
    vec![
        Action::ensure_account(ctx, &reward.account),
        Action::direct(
            ctx,
            Mutation::InsertStakingReward(NewReward {
                id: event.id.clone(),
                account: reward.account,
                amount: reward.amount,
                era: reward.era,
                validator: reward.validator,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::block_actions;
    use crate::actions::ActionKind;
    use crate::actions::Mutation;
    use crate::config::IngestFilter;
    use crate::core::ss58::AddressCodec;
    use crate::core::types::Block;
    use crate::decoding::testutils;
    use serde_json::json;
    use std::sync::Arc;

    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const CONTRACT: &str = "0x6be02d1d3665660d22ff9624b7be0551ee1ac91b";

    #[test]
    fn dapps_reward_keeps_era_and_contract() {
        let block = Block::dummy()
            .runtime(Arc::new(testutils::runtime(1, 0)))
            .with_event(
                "DappsStaking.Reward",
                json!([ALICE_HEX, {"__kind": "Evm", "value": CONTRACT}, 42, "1000"]),
            );
        let codec = AddressCodec::new(42);
        let actions = block_actions(&block, &codec, &IngestFilter::default()).unwrap();
        assert_eq!(actions.len(), 2);
        match &actions[1].kind {
            ActionKind::Direct(Mutation::InsertStakingReward(r)) => {
                assert_eq!(r.id, "0000000001-000000");
                assert_eq!(r.account, ALICE);
                assert_eq!(r.amount, 1000);
                assert_eq!(r.era, Some(42));
                assert_eq!(r.validator.as_deref(), Some(CONTRACT));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
