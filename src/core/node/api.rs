use reqwest;
use reqwest::StatusCode;

use super::models::Block;
use super::models::RuntimeMetadata;
use super::models::StorageRequest;
use super::NodeError;
use crate::core::oracle::RawValue;
use crate::core::types::BlockHash;
use crate::core::types::Height;
use crate::core::types::SpecVersion;

#[derive(Debug, Clone)]
pub struct ArchiveAPI {
    url: String,
    client: reqwest::Client,
}

impl ArchiveAPI {
    pub fn new(url: &str) -> Self {
        tracing::event!(tracing::Level::INFO, url);
        Self {
            url: url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Height of last archived block.
    pub async fn height(&self) -> Result<Height, NodeError> {
        let url = format!("{}/height", self.url);
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| NodeError::DeserializationError(e.to_string()))
    }

    /// Get blocks in (inclusive) height range.
    pub async fn blocks(&self, from: Height, to: Height) -> Result<Vec<Block>, NodeError> {
        let url = format!("{}/blocks?from={}&to={}", self.url, from, to);
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| NodeError::DeserializationError(e.to_string()))
    }

    /// Get runtime metadata fingerprints for given `spec_version`.
    pub async fn runtime(&self, spec_version: SpecVersion) -> Result<RuntimeMetadata, NodeError> {
        let url = format!("{}/runtime/{}", self.url, spec_version);
        let response = self.get(&url).await?;
        response
            .json()
            .await
            .map_err(|e| NodeError::DeserializationError(e.to_string()))
    }

    /// Read storage values at block `block_hash`.
    pub async fn storage(
        &self,
        block_hash: &BlockHash,
        item: &str,
        keys: &[String],
    ) -> Result<Vec<Option<RawValue>>, NodeError> {
        let url = format!("{}/storage", self.url);
        let body = StorageRequest {
            block_hash,
            item,
            keys,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|_| NodeError::ArchiveUnreachable)?;
        let response = check_status(response, &url)?;
        response
            .json()
            .await
            .map_err(|e| NodeError::DeserializationError(e.to_string()))
    }
}

impl ArchiveAPI {
    /// Send a GET request
    async fn get(&self, url: &str) -> Result<reqwest::Response, NodeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|_| NodeError::ArchiveUnreachable)?;
        check_status(response, url)
    }
}

fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response, NodeError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        StatusCode::BAD_REQUEST => Err(NodeError::API400BadRequest(url.to_string())),
        StatusCode::NOT_FOUND => Err(NodeError::API404Notfound(url.to_string())),
        _ => Err(NodeError::APIError(url.to_string())),
    }
}
