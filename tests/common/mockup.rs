//! In-process stand-ins for the archive and the EVM RPC endpoint.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use sw::core::node::NodeError;
use sw::core::oracle::RawValue;
use sw::core::oracle::RuntimeOracle;
use sw::core::types::Amount;
use sw::core::types::EvmAddress;
use sw::core::types::Header;
use sw::core::types::Height;
use sw::evm::introspection::IntrospectionError;
use sw::evm::introspection::TokenIntrospector;

/// Storage values by item name and key, the same at every block.
///
/// Plain storage values are stored under an empty key.
#[derive(Default)]
pub struct MockOracle {
    values: HashMap<(String, String), RawValue>,
    /// Requested (item, number of keys, height), in order.
    pub requests: Mutex<Vec<(String, usize, Height)>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, key: &str, value: RawValue) -> Self {
        self.values
            .insert((name.to_owned(), key.to_owned()), value);
        self
    }

    pub fn requests(&self) -> Vec<(String, usize, Height)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuntimeOracle for MockOracle {
    async fn storage(
        &self,
        header: &Header,
        name: &str,
        keys: &[String],
    ) -> Result<Vec<Option<RawValue>>, NodeError> {
        self.requests
            .lock()
            .unwrap()
            .push((name.to_owned(), keys.len(), header.height));
        if keys.is_empty() {
            return Ok(vec![self
                .values
                .get(&(name.to_owned(), String::new()))
                .cloned()]);
        }
        Ok(keys
            .iter()
            .map(|key| self.values.get(&(name.to_owned(), key.clone())).cloned())
            .collect())
    }
}

/// Token metadata known upfront.
#[derive(Default)]
pub struct StaticIntrospector {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub uri: Option<String>,
    /// Requested uri methods and token ids, in order.
    pub uri_requests: Mutex<Vec<(&'static str, Amount)>>,
}

impl StaticIntrospector {
    fn answer_uri(
        &self,
        method: &'static str,
        token_id: Amount,
    ) -> Result<String, IntrospectionError> {
        self.uri_requests.lock().unwrap().push((method, token_id));
        self.uri
            .clone()
            .ok_or(IntrospectionError::Rpc("execution reverted".to_owned()))
    }

    pub fn uri_requests(&self) -> Vec<(&'static str, Amount)> {
        self.uri_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenIntrospector for StaticIntrospector {
    async fn name(&self, _: &EvmAddress, _: Height) -> Result<String, IntrospectionError> {
        self.name
            .clone()
            .ok_or(IntrospectionError::Rpc("execution reverted".to_owned()))
    }

    async fn symbol(&self, _: &EvmAddress, _: Height) -> Result<String, IntrospectionError> {
        self.symbol
            .clone()
            .ok_or(IntrospectionError::Rpc("execution reverted".to_owned()))
    }

    async fn decimals(&self, _: &EvmAddress, _: Height) -> Result<u8, IntrospectionError> {
        // Never answers
        if self.decimals.is_none() {
            std::future::pending::<()>().await;
        }
        self.decimals.ok_or(IntrospectionError::Unreachable)
    }

    async fn uri(
        &self,
        _: &EvmAddress,
        token_id: Amount,
        _: Height,
    ) -> Result<String, IntrospectionError> {
        self.answer_uri("uri", token_id)
    }

    async fn token_uri(
        &self,
        _: &EvmAddress,
        token_id: Amount,
        _: Height,
    ) -> Result<String, IntrospectionError> {
        self.answer_uri("tokenURI", token_id)
    }
}
