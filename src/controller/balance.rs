use actix_web::{post, web, HttpResponse};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    controller::required_address, error::ApiError, state::State, utils::lamports_to_sol,
};

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Native balance in SOL
    pub balance: f64,
}

#[post("/balance")]
pub async fn index(
    state: web::Data<State>,
    body: web::Json<AddressRequest>,
) -> Result<HttpResponse, ApiError> {
    let address = required_address(body.address.as_deref(), "Address")?;
    let lamports = state.source()?.get_balance(&address).await?;
    debug!("Balance of {}: {} lamports", address, lamports);

    Ok(HttpResponse::Ok().json(BalanceResponse {
        balance: lamports_to_sol(lamports),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::Config;
    use crate::controller::test_support::{configured, state_with, FakeSource};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn returns_balance_in_sol() {
        let source = Arc::new(FakeSource { balance: 1_500_000_000, ..Default::default() });
        let state = state_with(configured(), source, Arc::new(ManualClock::new(0)));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(index)).await;

        let req = test::TestRequest::post()
            .uri("/balance")
            .set_json(json!({ "address": solana_sdk::pubkey::Pubkey::new_unique().to_string() }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "balance": 1.5 }));
    }

    #[actix_web::test]
    async fn missing_address_is_a_bad_request() {
        let state = state_with(configured(), Arc::new(FakeSource::default()), Arc::new(ManualClock::new(0)));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(index)).await;

        let req = test::TestRequest::post().uri("/balance").set_json(json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Address is required" }));
    }

    #[actix_web::test]
    async fn missing_rpc_url_is_a_server_error() {
        let config = Config { rpc_url: None, ..configured() };
        let state = state_with(config, Arc::new(FakeSource::default()), Arc::new(ManualClock::new(0)));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(index)).await;

        let req = test::TestRequest::post()
            .uri("/balance")
            .set_json(json!({ "address": solana_sdk::pubkey::Pubkey::new_unique().to_string() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
