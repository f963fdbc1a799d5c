use super::accounts::require;
use super::pipeline::Env;
use super::ActionContext;
use super::ActionError;
use super::NewContract;
use crate::core::types::Amount;
use crate::core::types::ContractType;
use crate::evm::bytecode;
use crate::evm::classify::classify;
use crate::evm::try_call;
use crate::store::types::EvmContractRecord;

/// Registers a deployed contract, once.
///
/// Token metadata is looked up best-effort, fields are left empty on
/// failure. NFT contracts get the metadata uri of token 0 looked up too.
pub(super) async fn create(
    env: &mut Env<'_>,
    ctx: &ActionContext,
    contract: &NewContract,
) -> Result<(), ActionError> {
    if env.store.get_evm_contract(&contract.address).await?.is_some() {
        tracing::debug!("contract {} exists already", contract.address);
        return Ok(());
    }
    require(env.store, &contract.deployer).await?;

    let (context, arguments) = bytecode::split(&contract.bytecode);
    let contract_type = classify(context);

    let (mut name, mut symbol, mut decimals, mut uri) = (None, None, None, None);
    if contract_type.is_token() {
        let address = &contract.address;
        let timeout = env.token_call_timeout;
        let introspector = env.introspector;
        name = try_call(introspector.name(address, ctx.height), timeout)
            .await
            .or_log(&format!("name() of {address}"));
        symbol = try_call(introspector.symbol(address, ctx.height), timeout)
            .await
            .or_log(&format!("symbol() of {address}"));
        decimals = try_call(introspector.decimals(address, ctx.height), timeout)
            .await
            .or_log(&format!("decimals() of {address}"))
            .map(i16::from);
        uri = match contract_type {
            ContractType::Erc721 => try_call(
                introspector.token_uri(address, Amount::ZERO, ctx.height),
                timeout,
            )
            .await
            .or_log(&format!("tokenURI(0) of {address}")),
            ContractType::Erc1155 => {
                try_call(introspector.uri(address, Amount::ZERO, ctx.height), timeout)
                    .await
                    .or_log(&format!("uri(0) of {address}"))
            }
            _ => None,
        };
    }

    let record = EvmContractRecord {
        id: contract.address.clone(),
        extrinsic_hash: ctx.extrinsic_hash.clone(),
        transaction_hash: contract.transaction_hash.clone(),
        deployer_id: contract.deployer.clone(),
        height: ctx.height,
        timestamp: ctx.timestamp,
        bytecode: contract.bytecode.clone(),
        bytecode_context: context.to_vec(),
        bytecode_arguments: arguments.to_vec(),
        contract_type,
        name,
        symbol,
        decimals,
        uri,
    };
    tracing::info!(
        "new {:?} contract {} at height {}",
        record.contract_type,
        record.id,
        record.height
    );
    env.store.insert_evm_contract(&record).await?;
    Ok(())
}
