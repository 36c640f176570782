use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_MS;
use crate::error::ApiError;

/// Configuration for the fee desk server and dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Solana RPC URL, required by every chain-backed endpoint
    pub rpc_url: Option<String>,
    /// DBC pool config whose pools and fees are served, required by the pool and fee endpoints
    pub pool_config_key: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    /// Freshness window of the pool listing cache
    pub pool_cache_ttl_ms: i64,
    /// Directory holding the dashboard's persisted cache
    pub cache_dir: PathBuf,
    /// Keypair used by the dashboard to sign claims
    pub keypair_path: PathBuf,
    /// Where the dashboard finds the server
    pub api_base_url: String,
    /// Minimum partner quote fee, in SOL, for a pool to be batch-claimed
    pub claim_threshold_sol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            pool_config_key: None,
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            pool_cache_ttl_ms: DEFAULT_TTL_MS,
            cache_dir: PathBuf::from(".cache"),
            keypair_path: PathBuf::from("keypair.json"),
            api_base_url: "http://127.0.0.1:8080/api".to_string(),
            claim_threshold_sol: "0.1".to_string(),
        }
    }
}

impl Config {
    pub fn rpc_url(&self) -> Result<&str, ApiError> {
        self.rpc_url
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("RPC_URL is not set".to_string()))
    }

    pub fn pool_config(&self) -> Result<Pubkey, ApiError> {
        let raw = self
            .pool_config_key
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("POOL_CONFIG_KEY is not set".to_string()))?;
        Pubkey::from_str(raw)
            .map_err(|e| ApiError::Configuration(format!("POOL_CONFIG_KEY is invalid: {}", e)))
    }
}

/// Loads configuration from environment variables, falling back to default values
pub fn load_config() -> Result<Config> {
    load_config_from(|key| env::var(key).ok())
}

/// Build a configuration from any key lookup
pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = Config::default();
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    config.rpc_url = non_empty("RPC_URL");
    config.pool_config_key = non_empty("POOL_CONFIG_KEY");

    if let Some(host) = non_empty("SERVER_HOST") {
        config.server_host = host;
    }

    if let Some(port) = non_empty("SERVER_PORT") {
        config.server_port = port
            .parse()
            .with_context(|| format!("SERVER_PORT is not a port number: {}", port))?;
    }

    if let Some(ttl) = non_empty("POOL_CACHE_TTL_MS") {
        config.pool_cache_ttl_ms = ttl
            .parse()
            .with_context(|| format!("POOL_CACHE_TTL_MS is not a number: {}", ttl))?;
    }

    if let Some(dir) = non_empty("CACHE_DIR") {
        config.cache_dir = PathBuf::from(dir);
    }

    if let Some(path) = non_empty("KEYPAIR_PATH") {
        config.keypair_path = PathBuf::from(path);
    }

    if let Some(url) = non_empty("API_BASE_URL") {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    if let Some(threshold) = non_empty("CLAIM_THRESHOLD_SOL") {
        config.claim_threshold_sol = threshold;
    }

    Ok(config)
}
