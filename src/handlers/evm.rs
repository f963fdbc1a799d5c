//! Contract deployments and token transfers.
use super::Scope;
use crate::actions::Action;
use crate::actions::ActionContext;
use crate::actions::Mutation;
use crate::actions::NewContract;
use crate::actions::NewTransfer;
use crate::constants::evm::TRANSFER_TOPIC;
use crate::core::ss58::decode_hex_fixed;
use crate::core::types::Amount;
use crate::core::types::AssetKind;
use crate::core::types::Event;
use crate::core::types::EvmAddress;
use crate::decoding::evm::TxAction;
use crate::decoding::evm::EXECUTED;
use crate::decoding::evm::LOG;
use crate::decoding::evm::TRANSACT_CALL;
use crate::decoding::primitives::u256_word;
use crate::decoding::DecodeError;
use crate::decoding::ShapeError;
use crate::evm::bytecode;

/// Successful creations register the new contract.
pub(super) fn executed(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let runtime = &scope.block.runtime;
    let executed = EXECUTED.decode(runtime, &event.args, scope.codec)?;
    if !executed.succeeded {
        return Ok(vec![]);
    }
    let Some(call) = scope.call_of(event, TRANSACT_CALL.name) else {
        return Ok(vec![]);
    };
    let transact = TRANSACT_CALL.decode(runtime, &call.args, scope.codec)?;
    if transact.action != TxAction::Create || !bytecode::is_creation(&transact.input) {
        return Ok(vec![]);
    }
    let deployer = scope
        .codec
        .evm_account(&executed.from)
        .map_err(|e| ShapeError::from(e).at(EXECUTED.name))?;
    Ok(vec![
        Action::direct(
            ctx,
            Mutation::EnsureAccount {
                id: deployer.clone(),
                evm_address: Some(executed.from),
            },
        ),
        Action::direct(
            ctx,
            Mutation::CreateEvmContract(NewContract {
                address: executed.to,
                deployer,
                transaction_hash: executed.transaction_hash,
                bytecode: transact.input,
            }),
        ),
    ])
}

/// ERC20 and ERC721 `Transfer` logs.
///
/// Both share the event signature, ERC721 has its token id indexed as a
/// third topic while ERC20 carries the amount as data.
pub(super) fn log(
    scope: &Scope,
    ctx: &ActionContext,
    event: &Event,
) -> Result<Vec<Action>, DecodeError> {
    let log = LOG.decode(&scope.block.runtime, &event.args, scope.codec)?;
    if log.topics.first().map(String::as_str) != Some(TRANSFER_TOPIC) {
        return Ok(vec![]);
    }
    let (asset, amount, token_id) = match log.topics.len() {
        3 => {
            let amount = u256_word(&log.data).map_err(|e| e.at(LOG.name))?;
            (AssetKind::Erc20, amount, None)
        }
        4 => (AssetKind::Erc721, Amount::from(1u64), Some(log.topics[3].clone())),
        n => {
            tracing::debug!("ignoring transfer log {} with {n} topics", event.id);
            return Ok(vec![]);
        }
    };
    let from = topic_address(&log.topics[1])?;
    let to = topic_address(&log.topics[2])?;
    let from_id = evm_account(scope, &from)?;
    let to_id = evm_account(scope, &to)?;
    Ok(vec![
        Action::direct(
            ctx,
            Mutation::EnsureAccount {
                id: from_id.clone(),
                evm_address: Some(from),
            },
        ),
        Action::direct(
            ctx,
            Mutation::EnsureAccount {
                id: to_id.clone(),
                evm_address: Some(to),
            },
        ),
        Action::direct(
            ctx,
            Mutation::InsertTransfer(NewTransfer {
                id: event.id.clone(),
                from: from_id,
                to: to_id,
                amount,
                success: true,
                asset,
                contract: Some(log.address),
                token_id,
            }),
        ),
    ])
}

/// Address held in the low 20 bytes of an indexed topic.
fn topic_address(topic: &str) -> Result<EvmAddress, DecodeError> {
    let word =
        decode_hex_fixed::<32>(topic).map_err(|e| ShapeError::from(e).at(LOG.name))?;
    Ok(format!("0x{}", hex::encode(&word[12..])))
}

fn evm_account(scope: &Scope, address: &str) -> Result<String, DecodeError> {
    scope
        .codec
        .evm_account(address)
        .map_err(|e| ShapeError::from(e).at(LOG.name))
}

#[cfg(test)]
mod tests {
    use super::super::block_actions;
    use crate::actions::ActionKind;
    use crate::actions::Mutation;
    use crate::config::IngestFilter;
    use crate::constants::evm::TRANSFER_TOPIC;
    use crate::core::ss58::AddressCodec;
    use crate::core::types::Amount;
    use crate::core::types::AssetKind;
    use crate::core::types::Block;
    use crate::decoding::testutils;
    use crate::decoding::DecodeError;
    use serde_json::json;
    use std::sync::Arc;

    const DEPLOYER: &str = "0x6be02d1d3665660d22ff9624b7be0551ee1ac91b";
    const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
    const RECEIVER: &str = "0x2222222222222222222222222222222222222222";

    fn topic(address: &str) -> String {
        format!("0x{:0>64}", address.trim_start_matches("0x"))
    }

    fn word(n: u64) -> String {
        format!("0x{:064x}", n)
    }

    fn transact(input: &str) -> serde_json::Value {
        json!({"transaction": {"__kind": "Legacy", "value": {
            "action": {"__kind": "Create"}, "input": input
        }}})
    }

    fn executed(status: &str) -> serde_json::Value {
        json!({
            "from": DEPLOYER,
            "to": CONTRACT,
            "transactionHash": "0xabc",
            "exitReason": {"__kind": status, "value": {"__kind": "Returned"}}
        })
    }

    fn kinds(block: &Block) -> Vec<ActionKind> {
        let codec = AddressCodec::new(5);
        block_actions(block, &codec, &IngestFilter::default())
            .unwrap()
            .into_iter()
            .map(|a| a.kind)
            .collect()
    }

    fn v2() -> Block {
        Block::dummy().runtime(Arc::new(testutils::runtime(2, 1)))
    }

    #[test]
    fn creation_registers_contract() {
        let block = v2()
            .with_call("Ethereum.transact", transact("0x6080604052"), true)
            .with_event_of_last_call("Ethereum.Executed", executed("Succeed"));
        let codec = AddressCodec::new(5);
        let deployer = codec.evm_account(DEPLOYER).unwrap();
        let kinds = kinds(&block);
        assert_eq!(kinds.len(), 2);
        assert_eq!(
            kinds[0],
            ActionKind::Direct(Mutation::EnsureAccount {
                id: deployer.clone(),
                evm_address: Some(DEPLOYER.to_owned()),
            })
        );
        match &kinds[1] {
            ActionKind::Direct(Mutation::CreateEvmContract(c)) => {
                assert_eq!(c.address, CONTRACT);
                assert_eq!(c.deployer, deployer);
                assert_eq!(c.bytecode, vec![0x60, 0x80, 0x60, 0x40, 0x52]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn reverted_or_non_creation_is_ignored() {
        let reverted = v2()
            .with_call("Ethereum.transact", transact("0x6080604052"), true)
            .with_event_of_last_call("Ethereum.Executed", executed("Revert"));
        assert!(kinds(&reverted).is_empty());

        let no_prologue = v2()
            .with_call("Ethereum.transact", transact("0xdeadbeef"), true)
            .with_event_of_last_call("Ethereum.Executed", executed("Succeed"));
        assert!(kinds(&no_prologue).is_empty());
    }

    #[test]
    fn erc20_transfer_log() {
        let block = v2().with_event(
            "EVM.Log",
            json!({"log": {
                "address": CONTRACT,
                "topics": [TRANSFER_TOPIC, topic(DEPLOYER), topic(RECEIVER)],
                "data": word(1_000),
            }}),
        );
        let kinds = kinds(&block);
        assert_eq!(kinds.len(), 3);
        match &kinds[2] {
            ActionKind::Direct(Mutation::InsertTransfer(t)) => {
                assert_eq!(t.asset, AssetKind::Erc20);
                assert_eq!(t.amount, Amount::from(1_000u64));
                assert_eq!(t.contract.as_deref(), Some(CONTRACT));
                assert_eq!(t.token_id, None);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn erc721_transfer_log() {
        let block = v2().with_event(
            "EVM.Log",
            json!({"log": {
                "address": CONTRACT,
                "topics": [TRANSFER_TOPIC, topic(DEPLOYER), topic(RECEIVER), word(7)],
                "data": "0x",
            }}),
        );
        match &kinds(&block)[2] {
            ActionKind::Direct(Mutation::InsertTransfer(t)) => {
                assert_eq!(t.asset, AssetKind::Erc721);
                assert_eq!(t.amount, Amount::from(1u64));
                assert_eq!(t.token_id, Some(word(7)));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn other_logs_are_ignored() {
        let block = v2().with_event(
            "EVM.Log",
            json!({"log": {"address": CONTRACT, "topics": [word(1)], "data": "0x"}}),
        );
        assert!(kinds(&block).is_empty());
    }

    #[test]
    fn full_width_token_amount() {
        let block = v2().with_event(
            "EVM.Log",
            json!({"log": {
                "address": CONTRACT,
                "topics": [TRANSFER_TOPIC, topic(DEPLOYER), topic(RECEIVER)],
                "data": format!("0x{}", "ff".repeat(32)),
            }}),
        );
        match &kinds(&block)[2] {
            ActionKind::Direct(Mutation::InsertTransfer(t)) => {
                assert_eq!(t.amount, Amount::MAX);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn malformed_address_topic() {
        // 64 bytes of hex length, with a multi-byte char around the address start
        let bad = format!("0x{}é{}", "0".repeat(23), "1".repeat(39));
        let block = v2().with_event(
            "EVM.Log",
            json!({"log": {
                "address": CONTRACT,
                "topics": [TRANSFER_TOPIC, bad, topic(RECEIVER)],
                "data": word(1),
            }}),
        );
        let codec = AddressCodec::new(5);
        let err = block_actions(&block, &codec, &IngestFilter::default()).unwrap_err();
        assert!(matches!(err.source, DecodeError::Malformed { item: "EVM.Log", .. }));
    }
}
