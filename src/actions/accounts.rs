use super::ActionContext;
use super::ActionError;
use crate::store::types::AccountRecord;
use crate::store::EntityStore;

/// Creates account `id` with zero balances unless it exists.
///
/// An existing account without evm link gets linked to `evm_address`.
pub(super) async fn ensure(
    store: &mut dyn EntityStore,
    ctx: &ActionContext,
    id: &str,
    evm_address: Option<&str>,
) -> Result<(), ActionError> {
    match store.get_account(id).await? {
        None => {
            let mut account = AccountRecord::new(id, ctx.height);
            account.evm_address = evm_address.map(|a| a.to_owned());
            store.insert_account(&account).await?;
        }
        Some(mut account) => {
            if account.evm_address.is_none() && evm_address.is_some() {
                account.evm_address = evm_address.map(|a| a.to_owned());
                store.save_account(&account).await?;
            }
        }
    }
    Ok(())
}

/// Fails unless account `id` exists.
pub(super) async fn require(store: &mut dyn EntityStore, id: &str) -> Result<(), ActionError> {
    match store.get_account(id).await? {
        Some(_) => Ok(()),
        None => Err(ActionError::MissingAccount(id.to_owned())),
    }
}
