use actix_web::{post, web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    controller::{optional_address, required_address},
    error::ApiError,
    fees::ClaimRequest,
    models::Amount,
    source::ClaimKind,
    state::State,
    utils::format_pubkey,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimBody {
    pub pool_address: Option<String>,
    #[serde(alias = "feeClaimer", alias = "creator", alias = "payerOrClaimerAddress")]
    pub claimer_address: Option<String>,
    #[serde(alias = "payer")]
    pub payer_address: Option<String>,
    pub max_base_amount: Option<Amount>,
    pub max_quote_amount: Option<Amount>,
    pub receiver_address: Option<String>,
}

impl ClaimBody {
    fn into_request(self) -> Result<ClaimRequest, ApiError> {
        let pool = required_address(self.pool_address.as_deref(), "Pool address")?;
        let claimer = required_address(self.claimer_address.as_deref(), "Claimer address")?;
        let payer = optional_address(self.payer_address.as_deref(), "Payer address")?.unwrap_or(claimer);
        let receiver = optional_address(self.receiver_address.as_deref(), "Receiver address")?;
        let max_base = self
            .max_base_amount
            .ok_or_else(|| ApiError::validation("Max base amount is required"))?;
        let max_quote = self
            .max_quote_amount
            .ok_or_else(|| ApiError::validation("Max quote amount is required"))?;

        Ok(ClaimRequest {
            pool,
            claimer,
            payer,
            max_base,
            max_quote,
            receiver,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// Unsigned transaction, base64
    pub transaction: String,
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

async fn draft(state: &State, kind: ClaimKind, body: ClaimBody) -> Result<HttpResponse, ApiError> {
    let request = body.into_request()?;
    let draft = state.source()?.build_claim_transaction(kind, &request).await?;

    info!(
        "Drafted {:?} fee claim for pool {} by {}",
        kind,
        format_pubkey(&request.pool),
        format_pubkey(&request.claimer)
    );
    Ok(HttpResponse::Ok().json(ClaimResponse {
        transaction: STANDARD.encode(&draft.transaction),
        blockhash: draft.blockhash.to_string(),
        last_valid_block_height: draft.last_valid_block_height,
    }))
}

/// Unsigned partner fee claim for the config's fee claimer
#[post("/claim/partner")]
pub async fn partner(
    state: web::Data<State>,
    body: web::Json<ClaimBody>,
) -> Result<HttpResponse, ApiError> {
    draft(&state, ClaimKind::Partner, body.into_inner()).await
}

/// Unsigned creator fee claim for the pool creator
#[post("/claim/creator")]
pub async fn creator(
    state: web::Data<State>,
    body: web::Json<ClaimBody>,
) -> Result<HttpResponse, ApiError> {
    draft(&state, ClaimKind::Creator, body.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::controller::test_support::{configured, state_with, FakeSource};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use solana_sdk::pubkey::Pubkey;
    use std::sync::Arc;

    #[actix_web::test]
    async fn drafts_partner_claim_as_base64() {
        let claimer = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let source = Arc::new(FakeSource { fee_claimer: Some(claimer), ..Default::default() });
        let state = state_with(configured(), source.clone(), Arc::new(ManualClock::new(0)));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(partner).service(creator),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/claim/partner")
            .set_json(json!({
                "poolAddress": pool.to_string(),
                "feeClaimer": claimer.to_string(),
                "maxBaseAmount": "18446744073709551615",
                "maxQuoteAmount": 200000000u64,
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["transaction"], json!("AQID"));
        assert_eq!(body["lastValidBlockHeight"], json!(77));

        let claims = source.claims.lock().unwrap();
        let (kind, request) = &claims[0];
        assert_eq!(*kind, ClaimKind::Partner);
        assert_eq!(request.pool, pool);
        assert_eq!(request.payer, claimer);
        assert_eq!(request.max_quote, Amount::from(200_000_000));
        assert!(request.receiver.is_none());
    }

    #[actix_web::test]
    async fn wrong_claimer_is_forbidden() {
        let source = Arc::new(FakeSource { fee_claimer: Some(Pubkey::new_unique()), ..Default::default() });
        let state = state_with(configured(), source, Arc::new(ManualClock::new(0)));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(creator)).await;

        let req = test::TestRequest::post()
            .uri("/claim/creator")
            .set_json(json!({
                "poolAddress": Pubkey::new_unique().to_string(),
                "creator": Pubkey::new_unique().to_string(),
                "maxBaseAmount": "1",
                "maxQuoteAmount": "1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn missing_amounts_are_rejected() {
        let state = state_with(configured(), Arc::new(FakeSource::default()), Arc::new(ManualClock::new(0)));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(partner)).await;

        let req = test::TestRequest::post()
            .uri("/claim/partner")
            .set_json(json!({
                "poolAddress": Pubkey::new_unique().to_string(),
                "claimerAddress": Pubkey::new_unique().to_string(),
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Max base amount is required"));
    }
}
