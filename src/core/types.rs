use alloy_primitives::U256;
use postgres_types::FromSql;
use postgres_types::ToSql;
use std::collections::HashMap;
use std::sync::Arc;

pub type AccountId = String;
/// Transferred amounts, wide enough for EVM token values.
pub type Amount = U256;
pub type Balance = u128;
pub type BlockHash = Digest32;
pub type CallID = String;
pub type Digest32 = String;
pub type EventID = String;
pub type EvmAddress = String;
pub type ExtrinsicHash = Digest32;
pub type Height = i32;
pub type SpecVersion = u32;
pub type Timestamp = i64;

/// Identifies the shape of an item under a given runtime.
///
/// Fingerprints are type hashes taken from the runtime metadata, one per
/// event, call or storage item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Runtime metadata relevant to decoding.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub spec_name: String,
    pub spec_version: SpecVersion,
    /// Maps item names (e.g. `Balances.Transfer`) to their fingerprint.
    pub fingerprints: HashMap<String, Fingerprint>,
}

impl Runtime {
    pub fn new(spec_name: &str, spec_version: SpecVersion) -> Self {
        Self {
            spec_name: spec_name.to_owned(),
            spec_version,
            fingerprints: HashMap::new(),
        }
    }

    /// Returns fingerprint of item `name`, if known to this runtime.
    pub fn fingerprint(&self, name: &str) -> Option<&Fingerprint> {
        self.fingerprints.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub height: Height,
    pub timestamp: Timestamp,
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
    pub spec_version: SpecVersion,
}

/// Last processed block.
#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    pub height: Height,
    pub timestamp: Timestamp,
    pub hash: BlockHash,
}

impl Head {
    /// Head of an empty store.
    pub fn initial() -> Self {
        Self {
            height: -1,
            timestamp: 0,
            hash: String::new(),
        }
    }

    pub fn is_initial(&self) -> bool {
        self.height == -1
    }
}

impl From<&Header> for Head {
    fn from(header: &Header) -> Self {
        Self {
            height: header.height,
            timestamp: header.timestamp,
            hash: header.hash.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extrinsic {
    pub index: u32,
    pub hash: ExtrinsicHash,
    /// Signer public key, hex encoded, for signed extrinsics.
    pub signer: Option<String>,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub id: CallID,
    pub name: String,
    pub args: serde_json::Value,
    pub success: bool,
    /// Signed origin of the call, hex encoded public key.
    pub origin: Option<String>,
    pub extrinsic_index: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventID,
    pub index: u32,
    pub name: String,
    pub args: serde_json::Value,
    /// Call that triggered the event, if any.
    pub call_id: Option<CallID>,
    pub extrinsic_index: Option<u32>,
}

/// Block items, in chain-observed order.
#[derive(Debug, Clone)]
pub enum Item {
    Call(Call),
    Event(Event),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Call(call) => &call.name,
            Item::Event(event) => &event.name,
        }
    }

    pub fn args(&self) -> &serde_json::Value {
        match self {
            Item::Call(call) => &call.args,
            Item::Event(event) => &event.args,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub header: Header,
    pub runtime: Arc<Runtime>,
    pub extrinsics: Vec<Extrinsic>,
    pub items: Vec<Item>,
}

impl Block {
    /// Returns call with given `id`.
    pub fn call(&self, id: &str) -> Option<&Call> {
        self.items.iter().find_map(|item| match item {
            Item::Call(call) if call.id == id => Some(call),
            _ => None,
        })
    }

    /// Returns the call that triggered `event`, if any.
    pub fn call_of(&self, event: &Event) -> Option<&Call> {
        event.call_id.as_deref().and_then(|id| self.call(id))
    }

    pub fn extrinsic(&self, index: u32) -> Option<&Extrinsic> {
        self.extrinsics.iter().find(|ex| ex.index == index)
    }
}

/// Registrar judgement of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSql, FromSql)]
#[postgres(name = "judgement")]
pub enum Judgement {
    #[postgres(name = "Unknown")]
    Unknown,
    #[postgres(name = "FeePaid")]
    FeePaid,
    #[postgres(name = "Reasonable")]
    Reasonable,
    #[postgres(name = "KnownGood")]
    KnownGood,
    #[postgres(name = "OutOfDate")]
    OutOfDate,
    #[postgres(name = "LowQuality")]
    LowQuality,
    #[postgres(name = "Erroneous")]
    Erroneous,
}

/// Asset moved by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSql, FromSql)]
#[postgres(name = "asset_kind")]
pub enum AssetKind {
    #[postgres(name = "native")]
    Native,
    #[postgres(name = "erc20")]
    Erc20,
    #[postgres(name = "erc721")]
    Erc721,
}

/// Contract classification from constructor bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSql, FromSql)]
#[postgres(name = "contract_type")]
pub enum ContractType {
    #[postgres(name = "ERC20")]
    Erc20,
    #[postgres(name = "ERC721")]
    Erc721,
    #[postgres(name = "ERC1155")]
    Erc1155,
    #[postgres(name = "basic")]
    Basic,
    #[postgres(name = "bare")]
    Bare,
    #[postgres(name = "unknown")]
    Unknown,
}

impl ContractType {
    /// True for types exposing token metadata (name, symbol).
    pub fn is_token(&self) -> bool {
        !matches!(self, ContractType::Unknown)
    }
}

#[cfg(feature = "test-utilities")]
pub mod testutils {
    use std::sync::Arc;

    use super::*;

    pub fn random_digest32() -> Digest32 {
        format!("0x{}", hex::encode(rand::random::<[u8; 32]>()))
    }

    impl Block {
        pub fn dummy() -> Self {
            Block {
                header: Header {
                    height: 1,
                    timestamp: 1_700_000_000_000,
                    hash: random_digest32(),
                    parent_hash: random_digest32(),
                    spec_version: 1,
                },
                runtime: Arc::new(Runtime::new("dummy", 1)),
                extrinsics: vec![],
                items: vec![],
            }
        }

        /// Returns a dummy block that is a child of `parent`.
        pub fn child_of(parent: &Block) -> Self {
            let mut block = Self::dummy()
                .height(parent.header.height + 1)
                .timestamp(parent.header.timestamp + 12_000)
                .runtime(parent.runtime.clone());
            block.header.parent_hash = parent.header.hash.clone();
            block
        }

        pub fn height(mut self, height: Height) -> Self {
            self.header.height = height;
            self
        }

        pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
            self.header.timestamp = timestamp;
            self
        }

        pub fn runtime(mut self, runtime: Arc<Runtime>) -> Self {
            self.header.spec_version = runtime.spec_version;
            self.runtime = runtime;
            self
        }

        /// Appends an extrinsic, signed by `signer` if any.
        pub fn with_extrinsic(mut self, signer: Option<&str>) -> Self {
            let index = self.extrinsics.len() as u32;
            self.extrinsics.push(Extrinsic {
                index,
                hash: random_digest32(),
                signer: signer.map(|s| s.to_owned()),
                success: true,
            });
            self
        }

        /// Appends an event, attached to last extrinsic if any.
        pub fn with_event(mut self, name: &str, args: serde_json::Value) -> Self {
            let index = self.items.len() as u32;
            let extrinsic_index = self.extrinsics.last().map(|ex| ex.index);
            self.items.push(Item::Event(Event {
                id: format!("{:010}-{:06}", self.header.height, index),
                index,
                name: name.to_owned(),
                args,
                call_id: None,
                extrinsic_index,
            }));
            self
        }

        /// Appends an event triggered by the last appended call.
        pub fn with_event_of_last_call(mut self, name: &str, args: serde_json::Value) -> Self {
            let call_id = self.items.iter().rev().find_map(|item| match item {
                Item::Call(call) => Some(call.id.clone()),
                _ => None,
            });
            self = self.with_event(name, args);
            if let Some(Item::Event(event)) = self.items.last_mut() {
                event.call_id = call_id;
            }
            self
        }

        /// Appends a call, attached to last extrinsic if any.
        pub fn with_call(mut self, name: &str, args: serde_json::Value, success: bool) -> Self {
            let index = self.items.len();
            let extrinsic = self.extrinsics.last();
            let call = Call {
                id: format!("{:010}-{:06}-call", self.header.height, index),
                name: name.to_owned(),
                args,
                success,
                origin: extrinsic.and_then(|ex| ex.signer.clone()),
                extrinsic_index: extrinsic.map(|ex| ex.index),
            };
            self.items.push(Item::Call(call));
            self
        }
    }

    impl Runtime {
        /// Registers fingerprint `fp` for item `name`.
        pub fn with(mut self, name: &str, fp: &str) -> Self {
            self.fingerprints.insert(name.to_owned(), Fingerprint::from(fp));
            self
        }
    }
}
