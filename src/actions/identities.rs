//! Identity and sub-identity reconciliation.
//!
//! Identities only exist for existing accounts and are never deleted,
//! killing one sets a flag. Removed subs keep their row, unlinked.
use super::ActionContext;
use super::ActionError;
use crate::core::types::Judgement;
use crate::decoding::identity::IdentityInfo;
use crate::store::types::IdentityRecord;
use crate::store::types::IdentitySubRecord;
use crate::store::EntityStore;

pub(super) async fn ensure(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
) -> Result<(), ActionError> {
    if store.get_identity(id).await?.is_some() {
        return Ok(());
    }
    if store.get_account(id).await?.is_none() {
        tracing::debug!("no account for identity {id}, skipping");
        return Ok(());
    }
    store
        .insert_identity(&IdentityRecord::new(id, ctx.height))
        .await?;
    Ok(())
}

pub(super) async fn set(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
    info: &IdentityInfo,
) -> Result<(), ActionError> {
    let Some(mut identity) = store.get_identity(id).await? else {
        return Ok(());
    };
    identity.set_info(info);
    identity.is_killed = false;
    identity.updated_at = ctx.height;
    store.save_identity(&identity).await?;
    Ok(())
}

pub(super) async fn clear(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
) -> Result<(), ActionError> {
    let Some(mut identity) = store.get_identity(id).await? else {
        return Ok(());
    };
    identity.clear();
    identity.updated_at = ctx.height;
    store.save_identity(&identity).await?;
    Ok(())
}

pub(super) async fn kill(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
) -> Result<(), ActionError> {
    let Some(mut identity) = store.get_identity(id).await? else {
        return Ok(());
    };
    identity.clear();
    identity.is_killed = true;
    identity.updated_at = ctx.height;
    store.save_identity(&identity).await?;
    Ok(())
}

pub(super) async fn judge(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
    judgement: Judgement,
) -> Result<(), ActionError> {
    let Some(mut identity) = store.get_identity(id).await? else {
        return Ok(());
    };
    identity.judgement = judgement;
    identity.updated_at = ctx.height;
    store.save_identity(&identity).await?;
    Ok(())
}

pub(super) async fn ensure_sub(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
) -> Result<(), ActionError> {
    if store.get_identity_sub(id).await?.is_some() {
        return Ok(());
    }
    if store.get_account(id).await?.is_none() {
        tracing::debug!("no account for sub {id}, skipping");
        return Ok(());
    }
    store
        .insert_identity_sub(&IdentitySubRecord::new(id, ctx.height))
        .await?;
    Ok(())
}

/// Links sub `sub` to identity `super_id`.
///
/// No-op if either is missing.
pub(super) async fn add_sub(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    sub: &str,
    super_id: &str,
    name: Option<String>,
) -> Result<(), ActionError> {
    let Some(mut record) = store.get_identity_sub(sub).await? else {
        return Ok(());
    };
    if store.get_identity(super_id).await?.is_none() {
        tracing::debug!("no identity {super_id} for sub {sub}, skipping");
        return Ok(());
    }
    record.super_id = Some(super_id.to_owned());
    record.name = name;
    record.updated_at = ctx.height;
    store.save_identity_sub(&record).await?;
    Ok(())
}

pub(super) async fn rename_sub(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    sub: &str,
    name: Option<String>,
) -> Result<(), ActionError> {
    let Some(mut record) = store.get_identity_sub(sub).await? else {
        return Ok(());
    };
    record.name = name;
    record.updated_at = ctx.height;
    store.save_identity_sub(&record).await?;
    Ok(())
}

pub(super) async fn remove_sub(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    sub: &IdentitySubRecord,
) -> Result<(), ActionError> {
    let mut record = sub.clone();
    record.super_id = None;
    record.name = None;
    record.updated_at = ctx.height;
    store.save_identity_sub(&record).await?;
    Ok(())
}
