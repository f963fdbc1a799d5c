//! Periodic chain-state snapshots.
use time::OffsetDateTime;

use super::ProcessError;
use crate::core::oracle::RuntimeOracle;
use crate::core::ss58::AddressCodec;
use crate::core::types::Block;
use crate::core::types::Timestamp;
use crate::decoding::system::TOTAL_ISSUANCE;
use crate::store::types::ChainStateRecord;
use crate::store::EntityStore;
use crate::store::StoreError;

/// Writes a [`ChainStateRecord`] whenever blocks enter a new bucket.
///
/// The cursor is the bucket of the last snapshot. It is restored from the
/// store on first use, or primed with the bucket of the first block seen.
#[derive(Debug)]
pub struct Snapshotter {
    interval_ms: i64,
    cursor: Option<Timestamp>,
    loaded: bool,
}

impl Snapshotter {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms,
            cursor: None,
            loaded: false,
        }
    }

    /// Start of the bucket containing `timestamp`.
    pub fn bucket(&self, timestamp: Timestamp) -> Timestamp {
        timestamp - timestamp.rem_euclid(self.interval_ms)
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.cursor
    }

    /// True if `block` is the first one of a new bucket.
    pub async fn is_due(
        &mut self,
        store: &mut dyn EntityStore,
        block: &Block,
    ) -> Result<bool, StoreError> {
        if !self.loaded {
            self.cursor = store.last_chain_state().await?.map(|cs| cs.timestamp);
            self.loaded = true;
            tracing::debug!("snapshot cursor: {:?}", self.cursor);
        }
        let bucket = self.bucket(block.header.timestamp);
        match self.cursor {
            Some(cursor) => Ok(bucket > cursor),
            None => {
                self.cursor = Some(bucket);
                Ok(false)
            }
        }
    }

    /// Records issuance and holder count as of `block`.
    pub async fn snapshot(
        &mut self,
        store: &mut dyn EntityStore,
        oracle: &dyn RuntimeOracle,
        block: &Block,
        codec: &AddressCodec,
    ) -> Result<ChainStateRecord, ProcessError> {
        let values = oracle
            .storage(&block.header, TOTAL_ISSUANCE.name, &[])
            .await?;
        let raw = match values.as_slice() {
            [Some(raw)] => raw,
            _ => {
                return Err(ProcessError::StorageMismatch {
                    item: TOTAL_ISSUANCE.name,
                    expected: 1,
                    actual: values.iter().flatten().count(),
                })
            }
        };
        let total_issuance = TOTAL_ISSUANCE.decode(&block.runtime, raw, codec)?;
        let holders = store.count_holders().await?;
        let record = ChainStateRecord {
            block_hash: block.header.hash.clone(),
            height: block.header.height,
            timestamp: self.bucket(block.header.timestamp),
            total_issuance,
            holders,
        };
        store.insert_chain_state(&record).await?;
        self.cursor = Some(record.timestamp);
        tracing::info!(
            "chain state for {} at height {}: {} holders, issuance {}",
            bucket_date(record.timestamp),
            record.height,
            record.holders,
            record.total_issuance
        );
        Ok(record)
    }
}

/// Calendar date (UTC) of a bucket start.
fn bucket_date(timestamp: Timestamp) -> String {
    match OffsetDateTime::from_unix_timestamp_nanos(timestamp as i128 * 1_000_000) {
        Ok(datetime) => datetime.date().to_string(),
        Err(_) => timestamp.to_string(),
    }
}
