use super::accounts::require;
use super::ActionContext;
use super::ActionError;
use super::NewTransfer;
use crate::store::types::TransferRecord;
use crate::store::EntityStore;

/// Inserts a transfer between existing accounts.
pub(super) async fn insert(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    transfer: &NewTransfer,
) -> Result<(), ActionError> {
    require(store, &transfer.from).await?;
    require(store, &transfer.to).await?;
    let record = TransferRecord {
        id: transfer.id.clone(),
        block_hash: ctx.block_hash.clone(),
        height: ctx.height,
        timestamp: ctx.timestamp,
        extrinsic_hash: ctx.extrinsic_hash.clone(),
        from_id: transfer.from.clone(),
        to_id: transfer.to.clone(),
        amount: transfer.amount,
        success: transfer.success,
        asset: transfer.asset,
        contract: transfer.contract.clone(),
        token_id: transfer.token_id.clone(),
    };
    store.insert_transfer(&record).await?;
    Ok(())
}
