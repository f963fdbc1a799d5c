use super::accounts::require;
use super::ActionContext;
use super::ActionError;
use super::NewReward;
use crate::store::types::StakingRewardRecord;
use crate::store::EntityStore;

pub(super) async fn insert(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    reward: &NewReward,
) -> Result<(), ActionError> {
    require(store, &reward.account).await?;
    let record = StakingRewardRecord {
        id: reward.id.clone(),
        block_hash: ctx.block_hash.clone(),
        height: ctx.height,
        timestamp: ctx.timestamp,
        extrinsic_hash: ctx.extrinsic_hash.clone(),
        account_id: reward.account.clone(),
        amount: reward.amount,
        era: reward.era.map(i64::from),
        validator: reward.validator.clone(),
    };
    store.insert_staking_reward(&record).await?;
    Ok(())
}
