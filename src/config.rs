use std::collections::HashSet;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::constants::DAY_MS;
use crate::constants::DEFAULT_BATCH_SIZE;
use crate::constants::DEFAULT_TOKEN_CALL_TIMEOUT_MS;
use crate::core::ss58::AddressCodec;
use crate::core::types::Height;
use crate::core::types::Item;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: `{value}`")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Postgresql connection URI postgresql://[userspec@][hostspec][/dbname][?paramspec]
    pub connection_uri: String,
}

impl PostgresConfig {
    pub fn new(uri: &str) -> Self {
        Self {
            connection_uri: uri.to_owned(),
        }
    }
}

/// Settings loaded once at startup and handed to the components needing them.
#[derive(Debug, Clone)]
pub struct Config {
    pub chain: String,
    pub ss58_prefix: u16,
    pub postgres: PostgresConfig,
    pub archive_url: String,
    /// EVM JSON-RPC endpoint used for token introspection.
    pub rpc_url: Option<String>,
    /// First block to be processed.
    pub start_height: Height,
    /// Max number of blocks per batch.
    pub batch_size: i32,
    pub token_call_timeout: Duration,
    /// Length of snapshot buckets (a day by default).
    pub snapshot_interval_ms: i64,
    pub filter: IngestFilter,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds config from a variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chain = var("SW_CHAIN").ok_or(ConfigError::Missing("SW_CHAIN"))?;
        let ss58_prefix = match var("SW_SS58_PREFIX") {
            Some(s) => parse("SW_SS58_PREFIX", &s)?,
            None => known_prefix(&chain).ok_or(ConfigError::Missing("SW_SS58_PREFIX"))?,
        };
        let pg_uri = var("SW_POSTGRES_URI").ok_or(ConfigError::Missing("SW_POSTGRES_URI"))?;
        let archive_url = var("SW_ARCHIVE_URL").ok_or(ConfigError::Missing("SW_ARCHIVE_URL"))?;
        let start_height = optional(&var, "SW_START_HEIGHT")?.unwrap_or(0);
        let batch_size = optional(&var, "SW_BATCH_SIZE")?.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size < 1 {
            return Err(ConfigError::Invalid {
                var: "SW_BATCH_SIZE",
                value: batch_size.to_string(),
            });
        }
        let timeout_ms =
            optional(&var, "SW_TOKEN_CALL_TIMEOUT_MS")?.unwrap_or(DEFAULT_TOKEN_CALL_TIMEOUT_MS);
        let snapshot_interval_ms = optional(&var, "SW_SNAPSHOT_INTERVAL_MS")?.unwrap_or(DAY_MS);
        if snapshot_interval_ms < 1 {
            return Err(ConfigError::Invalid {
                var: "SW_SNAPSHOT_INTERVAL_MS",
                value: snapshot_interval_ms.to_string(),
            });
        }
        let denylist = var("SW_DENYLIST")
            .map(|s| {
                s.split(',')
                    .map(|name| name.trim().to_owned())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let max_args_len = optional(&var, "SW_MAX_ARGS_LEN")?;

        Ok(Self {
            chain,
            ss58_prefix,
            postgres: PostgresConfig::new(&pg_uri),
            archive_url,
            rpc_url: var("SW_RPC_URL"),
            start_height,
            batch_size,
            token_call_timeout: Duration::from_millis(timeout_ms),
            snapshot_interval_ms,
            filter: IngestFilter::new(denylist, max_args_len),
        })
    }

    pub fn codec(&self) -> AddressCodec {
        AddressCodec::new(self.ss58_prefix)
    }
}

/// Address prefix of some well-known networks.
fn known_prefix(chain: &str) -> Option<u16> {
    match chain {
        "polkadot" => Some(0),
        "kusama" => Some(2),
        "astar" | "shiden" | "shibuya" => Some(5),
        "substrate" => Some(42),
        _ => None,
    }
}

fn optional<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    var(key).map(|s| parse(key, &s)).transpose()
}

fn parse<T: std::str::FromStr>(key: &'static str, s: &str) -> Result<T, ConfigError> {
    s.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key,
        value: s.to_owned(),
    })
}

/// Suppresses ingestion of noisy items.
#[derive(Debug, Clone, Default)]
pub struct IngestFilter {
    denylist: HashSet<String>,
    max_args_len: Option<usize>,
}

impl IngestFilter {
    pub fn new(denylist: HashSet<String>, max_args_len: Option<usize>) -> Self {
        Self {
            denylist,
            max_args_len,
        }
    }

    /// False for denylisted items and items with oversized arguments.
    pub fn admits(&self, item: &Item) -> bool {
        if self.denylist.contains(item.name()) {
            return false;
        }
        match self.max_args_len {
            Some(max) => item.args().to_string().len() <= max,
            None => true,
        }
    }
}
