use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{
    error::ApiError,
    fees::aggregate,
    models::{FeeMetric, FeeTotals},
    state::State,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
    pub fees: Vec<FeeMetric>,
    pub config_address: String,
    pub totals: FeeTotals,
}

/// Fee snapshot for every pool of the configured pool config. Never cached.
#[get("/fees")]
pub async fn index(state: web::Data<State>) -> Result<HttpResponse, ApiError> {
    let config = state.config.pool_config()?;
    let fees = state.source()?.get_pool_fee_metrics_by_config(&config).await?;
    let totals = aggregate(&fees);

    Ok(HttpResponse::Ok().json(FeesResponse {
        fees,
        config_address: config.to_string(),
        totals,
    }))
}
