use std::sync::Arc;

use crate::cache::{ReadThroughCache, SystemClock, MemoryStore};
use crate::config::Config;
use crate::error::ApiError;
use crate::meteora::DbcClient;
use crate::models::PoolRecord;
use crate::solana::create_client_from_config;
use crate::source::RemoteSource;

/// Shared server state, one instance per process
pub struct State {
    pub config: Config,
    source: Option<Arc<dyn RemoteSource>>,
    /// Pool listing for the configured pool config
    pub pools_cache: ReadThroughCache<Vec<PoolRecord>>,
}

impl State {
    /// Build the state from configuration. A missing RPC URL is not fatal here;
    /// endpoints that need the chain report it per request.
    pub fn from_config(config: Config) -> Self {
        let source = create_client_from_config(&config)
            .ok()
            .map(|client| Arc::new(DbcClient::new(client)) as Arc<dyn RemoteSource>);
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Option<Arc<dyn RemoteSource>>) -> Self {
        let pools_cache = ReadThroughCache::new(
            MemoryStore::new(),
            Arc::new(SystemClock),
            config.pool_cache_ttl_ms,
        );
        Self { config, source, pools_cache }
    }

    pub fn with_cache(
        config: Config,
        source: Option<Arc<dyn RemoteSource>>,
        pools_cache: ReadThroughCache<Vec<PoolRecord>>,
    ) -> Self {
        Self { config, source, pools_cache }
    }

    /// The remote source, or a configuration error when no RPC URL was given
    pub fn source(&self) -> Result<&dyn RemoteSource, ApiError> {
        self.config.rpc_url()?;
        self.source
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("RPC_URL is not set".to_string()))
    }
}
