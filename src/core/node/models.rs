use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::types;
use crate::core::types::BlockHash;
use crate::core::types::Fingerprint;
use crate::core::types::Height;
use crate::core::types::SpecVersion;
use crate::core::types::Timestamp;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeMetadata {
    pub spec_name: String,
    pub spec_version: SpecVersion,
    /// Type hash of each event, call and storage item.
    pub fingerprints: HashMap<String, String>,
}

impl From<RuntimeMetadata> for types::Runtime {
    fn from(md: RuntimeMetadata) -> Self {
        Self {
            spec_name: md.spec_name,
            spec_version: md.spec_version,
            fingerprints: md
                .fingerprints
                .into_iter()
                .map(|(name, hash)| (name, Fingerprint(hash)))
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: Header,
    #[serde(default)]
    pub extrinsics: Vec<Extrinsic>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Block {
    pub fn into_block(self, runtime: Arc<types::Runtime>) -> types::Block {
        types::Block {
            header: self.header.into(),
            runtime,
            extrinsics: self.extrinsics.into_iter().map(|ex| ex.into()).collect(),
            items: self.items.into_iter().map(|item| item.into()).collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub height: Height,
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
    pub timestamp: Timestamp,
    pub spec_version: SpecVersion,
}

impl From<Header> for types::Header {
    fn from(h: Header) -> Self {
        Self {
            height: h.height,
            timestamp: h.timestamp,
            hash: h.hash,
            parent_hash: h.parent_hash,
            spec_version: h.spec_version,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Extrinsic {
    pub index: u32,
    pub hash: String,
    pub signer: Option<String>,
    pub success: bool,
}

impl From<Extrinsic> for types::Extrinsic {
    fn from(ex: Extrinsic) -> Self {
        Self {
            index: ex.index,
            hash: ex.hash,
            signer: ex.signer,
            success: ex.success,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Item {
    #[serde(rename_all = "camelCase")]
    Call {
        id: String,
        name: String,
        #[serde(default)]
        args: serde_json::Value,
        success: bool,
        origin: Option<String>,
        extrinsic_index: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Event {
        id: String,
        index: u32,
        name: String,
        #[serde(default)]
        args: serde_json::Value,
        call_id: Option<String>,
        extrinsic_index: Option<u32>,
    },
}

impl From<Item> for types::Item {
    fn from(item: Item) -> Self {
        match item {
            Item::Call {
                id,
                name,
                args,
                success,
                origin,
                extrinsic_index,
            } => types::Item::Call(types::Call {
                id,
                name,
                args,
                success,
                origin,
                extrinsic_index,
            }),
            Item::Event {
                id,
                index,
                name,
                args,
                call_id,
                extrinsic_index,
            } => types::Item::Event(types::Event {
                id,
                index,
                name,
                args,
                call_id,
                extrinsic_index,
            }),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StorageRequest<'a> {
    pub block_hash: &'a str,
    pub item: &'a str,
    pub keys: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_archive_block() {
        let json = r#"{
            "header": {
                "height": 100,
                "hash": "0xaa",
                "parentHash": "0xbb",
                "timestamp": 1700000000000,
                "specVersion": 9
            },
            "extrinsics": [{"index": 1, "hash": "0xcc", "signer": null, "success": true}],
            "items": [
                {"kind": "call", "id": "c1", "name": "Balances.transfer", "args": {"value": "5"},
                 "success": true, "origin": null, "extrinsicIndex": 1},
                {"kind": "event", "id": "e1", "index": 0, "name": "Balances.Transfer",
                 "args": ["0x01", "0x02", "5"], "callId": "c1", "extrinsicIndex": 1}
            ]
        }"#;
        let nb: Block = serde_json::from_str(json).unwrap();
        let block = nb.into_block(Arc::new(types::Runtime::new("test", 9)));
        assert_eq!(block.header.height, 100);
        assert_eq!(block.header.parent_hash, "0xbb");
        assert_eq!(block.items.len(), 2);
        assert_eq!(block.items[1].name(), "Balances.Transfer");
        match &block.items[1] {
            types::Item::Event(ev) => {
                assert_eq!(block.call_of(ev).unwrap().name, "Balances.transfer");
            }
            _ => panic!("expected an event"),
        }
    }
}
