mod api;
pub mod models;

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::oracle::RawValue;
use super::oracle::RuntimeOracle;
use super::types::Block;
use super::types::Header;
use super::types::Height;
use super::types::Runtime;
use super::types::SpecVersion;
use api::ArchiveAPI;

/// Number of runtimes kept around.
const RUNTIME_CACHE_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Archive is unreachable. Could be a tempory outage but make sure your config is set correctly and the archive is running.")]
    ArchiveUnreachable,
    #[error("Bad archive API request: {0}")]
    API400BadRequest(String),
    #[error("Archive API request not found: {0}")]
    API404Notfound(String),
    #[error("Error while requesting ({0})")]
    APIError(String),
    #[error("Failed parsing response from archive: {0}")]
    DeserializationError(String),
}

/// Block source and runtime oracle backed by an archive.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    api: ArchiveAPI,
    runtimes: Arc<Mutex<LruCache<SpecVersion, Arc<Runtime>>>>,
}

impl Node {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: String::from(id),
            api: ArchiveAPI::new(url),
            runtimes: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(RUNTIME_CACHE_SIZE).expect("non zero cache size"),
            ))),
        }
    }

    /// Height of the archive's last block.
    pub async fn height(&self) -> Result<Height, NodeError> {
        self.api.height().await
    }

    /// Fetch blocks in given (inclusive) height range.
    pub async fn blocks(&self, from: Height, to: Height) -> Result<Vec<Block>, NodeError> {
        tracing::trace!("fetching blocks {from}-{to}");
        let node_blocks = self.api.blocks(from, to).await?;
        let mut blocks = Vec::with_capacity(node_blocks.len());
        for nb in node_blocks {
            let runtime = self.runtime(nb.header.spec_version).await?;
            blocks.push(nb.into_block(runtime));
        }
        Ok(blocks)
    }

    /// Runtime metadata for given `spec_version`, cached.
    async fn runtime(&self, spec_version: SpecVersion) -> Result<Arc<Runtime>, NodeError> {
        let mut cache = self.runtimes.lock().await;
        if let Some(rt) = cache.get(&spec_version) {
            return Ok(rt.clone());
        }
        tracing::debug!("loading runtime {spec_version}");
        let runtime = Arc::new(Runtime::from(self.api.runtime(spec_version).await?));
        cache.put(spec_version, runtime.clone());
        Ok(runtime)
    }
}

#[async_trait]
impl RuntimeOracle for Node {
    async fn storage(
        &self,
        header: &Header,
        name: &str,
        keys: &[String],
    ) -> Result<Vec<Option<RawValue>>, NodeError> {
        self.api.storage(&header.hash, name, keys).await
    }
}
