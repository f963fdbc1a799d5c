use async_trait::async_trait;

use super::node::NodeError;
use super::types::Header;

/// Raw storage value as delivered by the archive.
pub type RawValue = serde_json::Value;

/// Storage reads at a given block's state.
///
/// Fingerprints needed to decode the returned values are carried by the
/// block's runtime.
#[async_trait]
pub trait RuntimeOracle: Send + Sync {
    /// Read storage item `name` for each of `keys` at block `header`.
    ///
    /// Returns one entry per key, `None` for absent values.
    /// Plain storage values (no keys) are read by passing no keys and
    /// come back as a single entry.
    async fn storage(
        &self,
        header: &Header,
        name: &str,
        keys: &[String],
    ) -> Result<Vec<Option<RawValue>>, NodeError>;
}
