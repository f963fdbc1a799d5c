//! Accessors for the JSON shapes delivered by the archive.
use serde_json::Value;

use super::ShapeError;
use crate::core::ss58::decode_hex;
use crate::core::ss58::normalize_evm_address;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Amount;
use crate::core::types::Balance;
use crate::core::types::EvmAddress;

/// Field `idx` of a tuple-encoded value.
pub fn at(raw: &Value, idx: usize) -> Result<&Value, ShapeError> {
    raw.as_array()
        .and_then(|a| a.get(idx))
        .ok_or_else(|| ShapeError::Malformed(format!("missing field {idx}")))
}

/// Field `key` of a named-field value.
pub fn field<'a>(raw: &'a Value, key: &str) -> Result<&'a Value, ShapeError> {
    raw.as_object()
        .and_then(|o| o.get(key))
        .ok_or_else(|| ShapeError::Malformed(format!("missing field `{key}`")))
}

pub fn string(v: &Value) -> Result<&str, ShapeError> {
    v.as_str()
        .ok_or_else(|| ShapeError::Malformed(format!("expected a string, got {v}")))
}

pub fn boolean(v: &Value) -> Result<bool, ShapeError> {
    v.as_bool()
        .ok_or_else(|| ShapeError::Malformed(format!("expected a bool, got {v}")))
}

/// Enum variant name of a `{"__kind": ..}` value.
pub fn kind(v: &Value) -> Result<&str, ShapeError> {
    field(v, "__kind").and_then(string)
}

/// Unsigned integer, either a JSON number or a decimal string.
pub fn uint(v: &Value) -> Result<u128, ShapeError> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ShapeError::Malformed(format!("expected an unsigned int, got {n}"))),
        Value::String(s) => s
            .parse::<u128>()
            .map_err(|_| ShapeError::Malformed(format!("expected an unsigned int, got {s}"))),
        _ => Err(ShapeError::Malformed(format!(
            "expected an unsigned int, got {v}"
        ))),
    }
}

pub fn balance(v: &Value) -> Result<Balance, ShapeError> {
    uint(v)
}

pub fn uint32(v: &Value) -> Result<u32, ShapeError> {
    let n = uint(v)?;
    u32::try_from(n).map_err(|_| ShapeError::Malformed(format!("{n} exceeds u32")))
}

/// Hex encoded byte string.
pub fn bytes(v: &Value) -> Result<Vec<u8>, ShapeError> {
    Ok(decode_hex(string(v)?)?)
}

/// 32-byte public key, as an SS58 account id.
pub fn account(v: &Value, codec: &AddressCodec) -> Result<AccountId, ShapeError> {
    Ok(codec.encode_hex(string(v)?)?)
}

pub fn evm_address(v: &Value) -> Result<EvmAddress, ShapeError> {
    Ok(normalize_evm_address(string(v)?)?)
}

/// Resolves a multi-address to an account id.
///
/// Index addresses would need the indices pallet state and are reported as
/// not decodable.
pub fn multi_address(v: &Value, codec: &AddressCodec) -> Result<AccountId, ShapeError> {
    let value = field(v, "value")?;
    match kind(v)? {
        "Id" | "Address32" => account(value, codec),
        "Raw" => {
            let raw = bytes(value)?;
            match <[u8; 32]>::try_from(raw.as_slice()) {
                Ok(key) => Ok(codec.encode(&key)),
                Err(_) => Err(ShapeError::NotDecodable(v.to_string())),
            }
        }
        "Address20" => Ok(codec.evm_account(string(value)?)?),
        "Index" => Err(ShapeError::NotDecodable(v.to_string())),
        other => Err(ShapeError::Malformed(format!(
            "unknown address kind `{other}`"
        ))),
    }
}

/// Identity `Data` field.
///
/// `None` for empty data, text for `RawN` payloads and hex for hashed ones.
pub fn identity_data(v: &Value) -> Result<Option<String>, ShapeError> {
    match kind(v)? {
        "None" => Ok(None),
        k if k.starts_with("Raw") => {
            let raw = bytes(field(v, "value")?)?;
            Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
        }
        _ => Ok(Some(string(field(v, "value")?)?.to_owned())),
    }
}

/// Big-endian 256-bit word.
///
/// Shorter input is left-padded, longer input must fit 256 bits.
pub fn u256_word(raw: &[u8]) -> Result<Amount, ShapeError> {
    Amount::try_from_be_slice(raw).ok_or_else(|| {
        ShapeError::Malformed(format!("0x{} exceeds 256 bits", hex::encode(raw)))
    })
}
