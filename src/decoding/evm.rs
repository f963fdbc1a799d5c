use serde_json::Value;

use super::primitives::at;
use super::primitives::bytes;
use super::primitives::evm_address;
use super::primitives::field;
use super::primitives::kind;
use super::primitives::string;
use super::ShapeError;
use super::Version;
use super::Versioned;
use crate::core::ss58::AddressCodec;
use crate::core::types::EvmAddress;

#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub from: EvmAddress,
    /// Callee, or created contract for creations.
    pub to: EvmAddress,
    pub transaction_hash: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TxAction {
    Call(EvmAddress),
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transact {
    pub action: TxAction,
    pub input: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    pub address: EvmAddress,
    pub topics: Vec<String>,
    pub data: Vec<u8>,
}

pub static EXECUTED: Versioned<Executed> = Versioned {
    name: "Ethereum.Executed",
    versions: &[
        Version {
            fingerprint: "0x525adbccd915037cf02e56dc5d34bb20c02761ae95558902da5a7adb00b048ea",
            decode: executed_v1,
        },
        Version {
            fingerprint: "0xa8b25bda0370ff86dfa2a372d28039efadfc305589bad7ffd56957ef572b9454",
            decode: executed_v2,
        },
    ],
};

pub static LOG: Versioned<Log> = Versioned {
    name: "EVM.Log",
    versions: &[
        Version {
            fingerprint: "0xc6bec9c69ca3d475aa40ed20dea3d165764afb181c68934c577c964402a030d8",
            decode: log_v1,
        },
        Version {
            fingerprint: "0xc2e4b2c2d1ea48ec86bbd6587ef009e6284e9511c5818895af09d206b8f99548",
            decode: log_v2,
        },
    ],
};

/// Legacy transactions only at first, typed envelopes later on.
pub static TRANSACT_CALL: Versioned<Transact> = Versioned {
    name: "Ethereum.transact",
    versions: &[
        Version {
            fingerprint: "0xac35521610e927c6084efa0774450db85b4966bb4c7b8e4db03b36e3fdb006f6",
            decode: transact_v1,
        },
        Version {
            fingerprint: "0x5e68a6da25c92b20bebab90bd53c6532534d9d203f1a58de512a9dc5451f9133",
            decode: transact_v2,
        },
    ],
};

fn executed_v1(raw: &Value, _: &AddressCodec) -> Result<Executed, ShapeError> {
    Ok(Executed {
        from: evm_address(at(raw, 0)?)?,
        to: evm_address(at(raw, 1)?)?,
        transaction_hash: string(at(raw, 2)?)?.to_owned(),
        succeeded: kind(at(raw, 3)?)? == "Succeed",
    })
}

fn executed_v2(raw: &Value, _: &AddressCodec) -> Result<Executed, ShapeError> {
    Ok(Executed {
        from: evm_address(field(raw, "from")?)?,
        to: evm_address(field(raw, "to")?)?,
        transaction_hash: string(field(raw, "transactionHash")?)?.to_owned(),
        succeeded: kind(field(raw, "exitReason")?)? == "Succeed",
    })
}

fn log_v1(raw: &Value, _: &AddressCodec) -> Result<Log, ShapeError> {
    log(at(raw, 0)?)
}

fn log_v2(raw: &Value, _: &AddressCodec) -> Result<Log, ShapeError> {
    log(field(raw, "log")?)
}

fn log(v: &Value) -> Result<Log, ShapeError> {
    let topics = field(v, "topics")?
        .as_array()
        .ok_or_else(|| ShapeError::Malformed("topics is not a list".to_owned()))?
        .iter()
        .map(|t| string(t).map(|s| s.to_lowercase()))
        .collect::<Result<Vec<String>, ShapeError>>()?;
    Ok(Log {
        address: evm_address(field(v, "address")?)?,
        topics,
        data: bytes(field(v, "data")?)?,
    })
}

fn transact_v1(raw: &Value, _: &AddressCodec) -> Result<Transact, ShapeError> {
    transaction(field(raw, "transaction")?)
}

fn transact_v2(raw: &Value, _: &AddressCodec) -> Result<Transact, ShapeError> {
    let envelope = field(raw, "transaction")?;
    match kind(envelope)? {
        "Legacy" | "EIP2930" | "EIP1559" => transaction(field(envelope, "value")?),
        other => Err(ShapeError::NotDecodable(format!(
            "transaction type `{other}`"
        ))),
    }
}

fn transaction(tx: &Value) -> Result<Transact, ShapeError> {
    let action = field(tx, "action")?;
    let action = match kind(action)? {
        "Call" => TxAction::Call(evm_address(field(action, "value")?)?),
        "Create" => TxAction::Create,
        other => {
            return Err(ShapeError::Malformed(format!(
                "unknown transaction action `{other}`"
            )))
        }
    };
    Ok(Transact {
        action,
        input: bytes(field(tx, "input")?)?,
    })
}
