//! Token metadata lookups against a contract.
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::classify::selector;
use crate::core::types::Amount;
use crate::core::types::EvmAddress;
use crate::core::types::Height;

#[derive(Error, Debug)]
pub enum IntrospectionError {
    #[error("RPC endpoint is unreachable")]
    Unreachable,
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("could not decode call result: {0}")]
    Decoding(String),
    #[error("no RPC endpoint configured")]
    Disabled,
}

/// Best-effort token metadata calls.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn name(&self, contract: &EvmAddress, height: Height)
        -> Result<String, IntrospectionError>;

    async fn symbol(
        &self,
        contract: &EvmAddress,
        height: Height,
    ) -> Result<String, IntrospectionError>;

    async fn decimals(&self, contract: &EvmAddress, height: Height)
        -> Result<u8, IntrospectionError>;

    /// ERC1155 `uri(uint256)`.
    async fn uri(
        &self,
        contract: &EvmAddress,
        token_id: Amount,
        height: Height,
    ) -> Result<String, IntrospectionError>;

    /// ERC721 `tokenURI(uint256)`.
    async fn token_uri(
        &self,
        contract: &EvmAddress,
        token_id: Amount,
        height: Height,
    ) -> Result<String, IntrospectionError>;
}

/// Introspector for setups without an RPC endpoint.
pub struct NoIntrospection;

#[async_trait]
impl TokenIntrospector for NoIntrospection {
    async fn name(&self, _: &EvmAddress, _: Height) -> Result<String, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }

    async fn symbol(&self, _: &EvmAddress, _: Height) -> Result<String, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }

    async fn decimals(&self, _: &EvmAddress, _: Height) -> Result<u8, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }

    async fn uri(
        &self,
        _: &EvmAddress,
        _: Amount,
        _: Height,
    ) -> Result<String, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }

    async fn token_uri(
        &self,
        _: &EvmAddress,
        _: Amount,
        _: Height,
    ) -> Result<String, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }
}

/// EVM JSON-RPC client.
#[derive(Debug, Clone)]
pub struct EvmRpc {
    url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

impl EvmRpc {
    pub fn new(url: &str) -> Self {
        tracing::event!(tracing::Level::INFO, url);
        Self {
            url: url.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// `eth_call` of method `signature` at `height`.
    ///
    /// `args` are the ABI encoded arguments following the selector.
    async fn call(
        &self,
        contract: &EvmAddress,
        signature: &str,
        args: &[u8],
        height: Height,
    ) -> Result<Vec<u8>, IntrospectionError> {
        let data = call_data(signature, args);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": contract, "data": data}, format!("0x{:x}", height)],
        });
        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|_| IntrospectionError::Unreachable)?
            .json()
            .await
            .map_err(|e| IntrospectionError::Rpc(e.to_string()))?;
        if let Some(err) = response.error {
            return Err(IntrospectionError::Rpc(err.message));
        }
        let result = response
            .result
            .ok_or_else(|| IntrospectionError::Rpc("empty response".to_owned()))?;
        hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| IntrospectionError::Decoding(e.to_string()))
    }
}

#[async_trait]
impl TokenIntrospector for EvmRpc {
    async fn name(
        &self,
        contract: &EvmAddress,
        height: Height,
    ) -> Result<String, IntrospectionError> {
        decode_string(&self.call(contract, "name()", &[], height).await?)
    }

    async fn symbol(
        &self,
        contract: &EvmAddress,
        height: Height,
    ) -> Result<String, IntrospectionError> {
        decode_string(&self.call(contract, "symbol()", &[], height).await?)
    }

    async fn decimals(
        &self,
        contract: &EvmAddress,
        height: Height,
    ) -> Result<u8, IntrospectionError> {
        decode_u8(&self.call(contract, "decimals()", &[], height).await?)
    }

    async fn uri(
        &self,
        contract: &EvmAddress,
        token_id: Amount,
        height: Height,
    ) -> Result<String, IntrospectionError> {
        let arg = token_id.to_be_bytes::<32>();
        decode_string(&self.call(contract, "uri(uint256)", &arg, height).await?)
    }

    async fn token_uri(
        &self,
        contract: &EvmAddress,
        token_id: Amount,
        height: Height,
    ) -> Result<String, IntrospectionError> {
        let arg = token_id.to_be_bytes::<32>();
        decode_string(&self.call(contract, "tokenURI(uint256)", &arg, height).await?)
    }
}

/// Hex call data of method `signature` with encoded `args`.
fn call_data(signature: &str, args: &[u8]) -> String {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(args);
    format!("0x{}", hex::encode(data))
}

/// Decodes an ABI encoded `string`, or a `bytes32` as used by some older
/// tokens.
pub fn decode_string(data: &[u8]) -> Result<String, IntrospectionError> {
    let text = match data.len() {
        32 => data
            .iter()
            .take_while(|b| **b != 0)
            .copied()
            .collect::<Vec<u8>>(),
        n if n >= 64 => {
            let offset = word_to_usize(&data[0..32])?;
            let len_end = offset
                .checked_add(32)
                .filter(|end| *end <= n)
                .ok_or_else(|| IntrospectionError::Decoding("bad string offset".to_owned()))?;
            let len = word_to_usize(&data[offset..len_end])?;
            let end = len_end
                .checked_add(len)
                .filter(|end| *end <= n)
                .ok_or_else(|| IntrospectionError::Decoding("bad string length".to_owned()))?;
            data[len_end..end].to_vec()
        }
        n => {
            return Err(IntrospectionError::Decoding(format!(
                "unexpected result length {n}"
            )))
        }
    };
    String::from_utf8(text).map_err(|e| IntrospectionError::Decoding(e.to_string()))
}

pub fn decode_u8(data: &[u8]) -> Result<u8, IntrospectionError> {
    let n = word_to_usize(data)?;
    u8::try_from(n).map_err(|_| IntrospectionError::Decoding(format!("{n} exceeds u8")))
}

fn word_to_usize(word: &[u8]) -> Result<usize, IntrospectionError> {
    if word.len() != 32 || word[..24].iter().any(|b| *b != 0) {
        return Err(IntrospectionError::Decoding("word out of range".to_owned()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[24..32]);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| IntrospectionError::Decoding("word out of range".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(n: u64) -> Vec<u8> {
        let mut w = vec![0u8; 24];
        w.extend(n.to_be_bytes());
        w
    }

    #[test]
    fn decodes_abi_string() {
        let mut data = word(32);
        data.extend(word(4));
        let mut text = b"Astr".to_vec();
        text.resize(32, 0);
        data.extend(text);
        assert_eq!(decode_string(&data).unwrap(), "Astr");
    }

    #[test]
    fn decodes_bytes32_string() {
        let mut data = b"MKR".to_vec();
        data.resize(32, 0);
        assert_eq!(decode_string(&data).unwrap(), "MKR");
    }

    #[test]
    fn rejects_out_of_bounds_string() {
        let mut data = word(32);
        data.extend(word(400));
        assert!(decode_string(&data).is_err());
        assert!(decode_string(&[1, 2, 3]).is_err());
    }

    #[test]
    fn call_data_with_token_id() {
        assert_eq!(call_data("name()", &[]), "0x06fdde03");
        let arg = Amount::from(7u64).to_be_bytes::<32>();
        assert_eq!(
            call_data("tokenURI(uint256)", &arg),
            format!("0xc87b56dd{:064x}", 7)
        );
        assert_eq!(
            call_data("uri(uint256)", &arg),
            format!("0x0e89341c{:064x}", 7)
        );
    }

    #[test]
    fn decodes_decimals() {
        assert_eq!(decode_u8(&word(18)).unwrap(), 18);
        assert!(decode_u8(&word(256)).is_err());
    }
}
