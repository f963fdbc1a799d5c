//! Per-topic handlers turning block items into actions.
//!
//! Handlers only read the block. All store access happens later, when the
//! emitted actions get executed. Actions a handler depends on (e.g. ensuring
//! the accounts of a transfer) are emitted ahead of it.
mod balances;
mod evm;
mod identity;
mod staking;

use thiserror::Error;

use crate::actions::Action;
use crate::actions::ActionContext;
use crate::config::IngestFilter;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Block;
use crate::core::types::Call;
use crate::core::types::Event;
use crate::core::types::Item;
use crate::decoding::DecodeError;
use crate::decoding::ShapeError;

#[derive(Error, Debug)]
#[error("failed handling item `{item}`")]
pub struct HandlerError {
    /// Id of the offending event or call.
    pub item: String,
    #[source]
    pub source: DecodeError,
}

/// What handlers get to see of a block.
pub(crate) struct Scope<'a> {
    pub block: &'a Block,
    pub codec: &'a AddressCodec,
}

impl<'a> Scope<'a> {
    /// Context of actions emitted for an item of extrinsic `extrinsic_index`.
    fn context(&self, extrinsic_index: Option<u32>) -> ActionContext {
        let header = &self.block.header;
        ActionContext {
            height: header.height,
            timestamp: header.timestamp,
            block_hash: header.hash.clone(),
            extrinsic_hash: extrinsic_index
                .and_then(|idx| self.block.extrinsic(idx))
                .map(|ex| ex.hash.clone()),
            extrinsic_index,
        }
    }

    /// Triggering call of `event`, if named `name`.
    fn call_of(&self, event: &Event, name: &str) -> Option<&'a Call> {
        self.block.call_of(event).filter(|call| call.name == name)
    }

    /// Account of a call's signed origin.
    fn origin(&self, call: &Call, item: &'static str) -> Result<Option<AccountId>, DecodeError> {
        call.origin
            .as_deref()
            .map(|hex| self.codec.encode_hex(hex))
            .transpose()
            .map_err(|e| ShapeError::from(e).at(item))
    }
}

/// Actions for all items of `block`, in block order.
///
/// Items rejected by `filter` are skipped before decoding.
pub fn block_actions(
    block: &Block,
    codec: &AddressCodec,
    filter: &IngestFilter,
) -> Result<Vec<Action>, HandlerError> {
    let scope = Scope { block, codec };
    let mut actions = vec![];
    for item in &block.items {
        if !filter.admits(item) {
            tracing::trace!("skipping filtered item {}", item.name());
            continue;
        }
        let (id, result) = match item {
            Item::Event(event) => (&event.id, handle_event(&scope, event)),
            Item::Call(call) => (&call.id, handle_call(&scope, call)),
        };
        let item_actions = result.map_err(|source| HandlerError {
            item: id.clone(),
            source,
        })?;
        actions.extend(item_actions);
    }
    tracing::debug!(
        "block {} yielded {} actions",
        block.header.height,
        actions.len()
    );
    Ok(actions)
}

fn handle_event(scope: &Scope, event: &Event) -> Result<Vec<Action>, DecodeError> {
    let ctx = scope.context(event.extrinsic_index);
    match event.name.as_str() {
        "Balances.Transfer" => balances::transfer(scope, &ctx, event),
        "Balances.Endowed" => balances::endowed(scope, &ctx, event),
        "Identity.IdentitySet" => identity::identity_set(scope, &ctx, event),
        "Identity.IdentityCleared" => identity::identity_cleared(scope, &ctx, event),
        "Identity.IdentityKilled" => identity::identity_killed(scope, &ctx, event),
        "Identity.JudgementGiven" => identity::judgement_given(scope, &ctx, event),
        "Identity.SubIdentityAdded" => identity::sub_added(scope, &ctx, event),
        "Identity.SubIdentityRemoved" => identity::sub_removed(scope, &ctx, event),
        "Identity.SubIdentityRevoked" => identity::sub_revoked(scope, &ctx, event),
        "Staking.Rewarded" => staking::rewarded(scope, &ctx, event),
        "DappsStaking.Reward" => staking::dapps_reward(scope, &ctx, event),
        "Ethereum.Executed" => evm::executed(scope, &ctx, event),
        "EVM.Log" => evm::log(scope, &ctx, event),
        _ => Ok(vec![]),
    }
}

fn handle_call(scope: &Scope, call: &Call) -> Result<Vec<Action>, DecodeError> {
    let ctx = scope.context(call.extrinsic_index);
    match call.name.as_str() {
        "Balances.transfer" | "Balances.transfer_keep_alive" if !call.success => {
            balances::failed_transfer(scope, &ctx, call)
        }
        "Identity.set_subs" if call.success => identity::set_subs(scope, &ctx, call),
        "Identity.rename_sub" if call.success => identity::rename_sub(scope, &ctx, call),
        _ => Ok(vec![]),
    }
}
