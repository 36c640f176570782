use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{controller::required_address, error::ApiError, models::PoolRecord, state::State};

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub mint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PoolResponse {
    pub pool: PoolRecord,
}

/// Look up the launch pool of a base mint.
/// An unknown mint is answered with a 500 and a descriptive message.
#[post("/pool-by-mint")]
pub async fn index(
    state: web::Data<State>,
    body: web::Json<MintRequest>,
) -> Result<HttpResponse, ApiError> {
    let mint = required_address(body.mint.as_deref(), "Mint")?;
    let source = state.source()?;

    let pool = source
        .get_pool_by_base_mint(&mint)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pool not found for mint {}", mint)))?;
    let metadata = source.get_asset_metadata(&mint).await.ok().flatten();

    Ok(HttpResponse::Ok().json(PoolResponse {
        pool: pool.with_metadata(metadata),
    }))
}
