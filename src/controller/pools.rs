use actix_web::{get, web, HttpResponse};
use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::{
    error::ApiError, models::PoolRecord, source::RemoteSource, state::State,
    utils::format_pubkey,
};

#[derive(Debug, Default, Deserialize)]
pub struct PoolsQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolsResponse<'a> {
    pub pools: &'a [PoolRecord],
    pub count: usize,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
}

/// Pools of `config` with base-token metadata attached.
/// A metadata lookup that fails leaves that pool's metadata empty.
pub async fn fetch_pools_with_metadata(
    source: &dyn RemoteSource,
    config: &Pubkey,
) -> Result<Vec<PoolRecord>, ApiError> {
    let pools = source.get_pools_by_config(config).await?;

    let lookups = pools.iter().map(|pool| source.get_asset_metadata(&pool.base_mint));
    let metadata = join_all(lookups).await;

    Ok(pools
        .into_iter()
        .zip(metadata)
        .map(|(pool, metadata)| {
            let metadata = metadata.unwrap_or_else(|e| {
                warn!("No metadata for {}: {}", format_pubkey(&pool.base_mint), e);
                None
            });
            pool.with_metadata(metadata)
        })
        .collect())
}

#[get("/pools")]
pub async fn index(
    state: web::Data<State>,
    query: web::Query<PoolsQuery>,
) -> Result<HttpResponse, ApiError> {
    let config = state.config.pool_config()?;
    let source = state.source()?;

    let cached = state
        .pools_cache
        .get(query.refresh, || fetch_pools_with_metadata(source, &config))
        .await?;

    if !cached.served_from_cache {
        info!("Refreshed pool cache with {} pools", cached.payload.len());
    }

    Ok(HttpResponse::Ok().json(PoolsResponse {
        pools: &cached.payload,
        count: cached.payload.len(),
        cached: cached.served_from_cache,
        cache_age: cached.age_ms,
    }))
}
