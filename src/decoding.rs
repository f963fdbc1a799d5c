//! Runtime-versioned decoding of events, calls and storage items.
//!
//! Every decodable item is declared as a [`Versioned`] static listing the
//! fingerprints it is known under, oldest first, each with the function
//! normalizing that version's shape. Supporting a new runtime means
//! appending an entry, dispatch itself never changes.
pub mod balances;
pub mod evm;
pub mod identity;
pub mod primitives;
pub mod staking;
pub mod system;

use serde_json::Value;
use thiserror::Error;

use crate::core::ss58::AddressCodec;
use crate::core::ss58::AddressError;
use crate::core::types::Fingerprint;
use crate::core::types::Runtime;

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("unknown version of `{0}`")]
    UnknownVersion(&'static str),
    #[error("unsupported data in `{item}`: {data}")]
    DataNotDecodable { item: &'static str, data: String },
    #[error("malformed `{item}`: {reason}")]
    Malformed { item: &'static str, reason: String },
}

/// Failure of a single version's decode function.
///
/// Gets tagged with the item name by [`Versioned`].
#[derive(Error, Debug, PartialEq)]
pub enum ShapeError {
    #[error("not decodable: {0}")]
    NotDecodable(String),
    #[error("{0}")]
    Malformed(String),
}

impl ShapeError {
    pub fn at(self, item: &'static str) -> DecodeError {
        match self {
            ShapeError::NotDecodable(data) => DecodeError::DataNotDecodable { item, data },
            ShapeError::Malformed(reason) => DecodeError::Malformed { item, reason },
        }
    }
}

impl From<AddressError> for ShapeError {
    fn from(err: AddressError) -> Self {
        ShapeError::Malformed(err.to_string())
    }
}

pub type DecodeFn<T> = fn(&Value, &AddressCodec) -> Result<T, ShapeError>;

pub struct Version<T: 'static> {
    pub fingerprint: &'static str,
    pub decode: DecodeFn<T>,
}

/// An item decodable under one or more runtime versions.
pub struct Versioned<T: 'static> {
    pub name: &'static str,
    /// Known versions, in order of introduction.
    pub versions: &'static [Version<T>],
}

impl<T: 'static> Versioned<T> {
    /// Decode `raw` using the version `runtime` declares for this item.
    pub fn decode(
        &self,
        runtime: &Runtime,
        raw: &Value,
        codec: &AddressCodec,
    ) -> Result<T, DecodeError> {
        self.decode_with(runtime.fingerprint(self.name), raw, codec)
    }

    /// Decode `raw` as the first version matching `fingerprint`.
    pub fn decode_with(
        &self,
        fingerprint: Option<&Fingerprint>,
        raw: &Value,
        codec: &AddressCodec,
    ) -> Result<T, DecodeError> {
        let version = fingerprint
            .and_then(|fp| self.versions.iter().find(|v| v.fingerprint == fp.as_str()))
            .ok_or(DecodeError::UnknownVersion(self.name))?;
        (version.decode)(raw, codec).map_err(|e| e.at(self.name))
    }

    /// True if `runtime` declares a version of this item we can decode.
    pub fn is_known(&self, runtime: &Runtime) -> bool {
        runtime
            .fingerprint(self.name)
            .map_or(false, |fp| self.versions.iter().any(|v| v.fingerprint == fp.as_str()))
    }

    /// Fingerprint of the `n`-th known version.
    pub fn fingerprint(&self, n: usize) -> &'static str {
        self.versions[n].fingerprint
    }
}

/// Type-erased view of a [`Versioned`] item.
pub trait Catalogued: Sync {
    fn name(&self) -> &'static str;
    fn fingerprints(&self) -> Vec<&'static str>;
}

impl<T: 'static> Catalogued for Versioned<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fingerprints(&self) -> Vec<&'static str> {
        self.versions.iter().map(|v| v.fingerprint).collect()
    }
}

/// All decodable items.
pub static CATALOG: &[&dyn Catalogued] = &[
    &balances::TRANSFER,
    &balances::ENDOWED,
    &balances::DEPOSIT,
    &balances::WITHDRAW,
    &balances::RESERVED,
    &balances::UNRESERVED,
    &balances::BALANCE_SET,
    &balances::DUST_LOST,
    &balances::TRANSFER_CALL,
    &balances::TRANSFER_KEEP_ALIVE_CALL,
    &identity::IDENTITY_SET,
    &identity::IDENTITY_CLEARED,
    &identity::IDENTITY_KILLED,
    &identity::JUDGEMENT_GIVEN,
    &identity::SUB_IDENTITY_ADDED,
    &identity::SUB_IDENTITY_REMOVED,
    &identity::SUB_IDENTITY_REVOKED,
    &identity::SET_IDENTITY_CALL,
    &identity::SET_SUBS_CALL,
    &identity::ADD_SUB_CALL,
    &identity::RENAME_SUB_CALL,
    &identity::PROVIDE_JUDGEMENT_CALL,
    &staking::REWARDED,
    &staking::DAPPS_REWARD,
    &evm::EXECUTED,
    &evm::LOG,
    &evm::TRANSACT_CALL,
    &system::ACCOUNT,
    &system::TOTAL_ISSUANCE,
];

/// Names of catalogued items `runtime` declares under a fingerprint we
/// have no decoder for.
pub fn unknown_items(runtime: &Runtime) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|item| match runtime.fingerprint(item.name()) {
            Some(fp) => !item.fingerprints().contains(&fp.as_str()),
            None => false,
        })
        .map(|item| item.name())
        .collect()
}

#[cfg(feature = "test-utilities")]
pub mod testutils {
    use super::CATALOG;
    use crate::core::types::Fingerprint;
    use crate::core::types::Runtime;
    use crate::core::types::SpecVersion;

    /// A runtime declaring the `n`-th version of every catalogued item, or
    /// its latest one for items with fewer versions.
    pub fn runtime(spec_version: SpecVersion, n: usize) -> Runtime {
        let mut runtime = Runtime::new("test", spec_version);
        for item in CATALOG {
            let fps = item.fingerprints();
            let fp = fps[n.min(fps.len() - 1)];
            runtime
                .fingerprints
                .insert(item.name().to_owned(), Fingerprint::from(fp));
        }
        runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first(raw: &Value, _: &AddressCodec) -> Result<u32, ShapeError> {
        Ok(raw[0].as_u64().ok_or(ShapeError::Malformed("no".into()))? as u32)
    }

    fn named(raw: &Value, _: &AddressCodec) -> Result<u32, ShapeError> {
        Ok(raw["n"].as_u64().ok_or(ShapeError::Malformed("no".into()))? as u32)
    }

    fn refuse(raw: &Value, _: &AddressCodec) -> Result<u32, ShapeError> {
        Err(ShapeError::NotDecodable(raw.to_string()))
    }

    static ITEM: Versioned<u32> = Versioned {
        name: "Test.Item",
        versions: &[
            Version {
                fingerprint: "0x01",
                decode: first,
            },
            Version {
                fingerprint: "0x02",
                decode: named,
            },
            Version {
                fingerprint: "0x02",
                decode: refuse,
            },
            Version {
                fingerprint: "0x03",
                decode: refuse,
            },
        ],
    };

    #[test]
    fn versions_normalize_to_same_value() {
        let codec = AddressCodec::new(42);
        let v1 = Runtime::new("t", 1).with("Test.Item", "0x01");
        let v2 = Runtime::new("t", 2).with("Test.Item", "0x02");
        assert_eq!(ITEM.decode(&v1, &json!([7]), &codec), Ok(7));
        assert_eq!(ITEM.decode(&v2, &json!({"n": 7}), &codec), Ok(7));
    }

    #[test]
    fn first_matching_version_wins() {
        let codec = AddressCodec::new(42);
        let fp = Fingerprint::from("0x02");
        assert_eq!(ITEM.decode_with(Some(&fp), &json!({"n": 3}), &codec), Ok(3));
    }

    #[test]
    fn unregistered_fingerprint_is_unknown_version() {
        let codec = AddressCodec::new(42);
        let rt = Runtime::new("t", 9).with("Test.Item", "0xff");
        assert_eq!(
            ITEM.decode(&rt, &json!([1]), &codec),
            Err(DecodeError::UnknownVersion("Test.Item"))
        );
        assert!(!ITEM.is_known(&rt));
    }

    #[test]
    fn missing_fingerprint_is_unknown_version() {
        let codec = AddressCodec::new(42);
        let rt = Runtime::new("t", 9);
        assert_eq!(
            ITEM.decode(&rt, &json!([1]), &codec),
            Err(DecodeError::UnknownVersion("Test.Item"))
        );
    }

    #[test]
    fn catalog_runtimes_are_fully_known() {
        let v1 = testutils::runtime(1, 0);
        let v2 = testutils::runtime(2, 1);
        assert!(unknown_items(&v1).is_empty());
        assert!(unknown_items(&v2).is_empty());
        assert!(balances::TRANSFER.is_known(&v2));
    }

    #[test]
    fn unknown_items_lists_unsupported_fingerprints() {
        let rt = testutils::runtime(1, 0).with("Balances.Transfer", "0xff");
        assert_eq!(unknown_items(&rt), vec!["Balances.Transfer"]);
    }

    #[test]
    fn unsupported_data_is_distinct_from_unknown_version() {
        let codec = AddressCodec::new(42);
        let rt = Runtime::new("t", 3).with("Test.Item", "0x03");
        assert_eq!(
            ITEM.decode(&rt, &json!([1]), &codec),
            Err(DecodeError::DataNotDecodable {
                item: "Test.Item",
                data: "[1]".to_owned()
            })
        );
    }
}
