use actix_web::{post, web, HttpResponse};
use serde::Serialize;

use crate::{
    controller::{balance::AddressRequest, required_address},
    error::ApiError,
    models::TokenAccount,
    state::State,
};

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenAccount>,
}

#[post("/tokens")]
pub async fn index(
    state: web::Data<State>,
    body: web::Json<AddressRequest>,
) -> Result<HttpResponse, ApiError> {
    let address = required_address(body.address.as_deref(), "Address")?;
    let tokens = state.source()?.get_token_accounts(&address).await?;

    Ok(HttpResponse::Ok().json(TokensResponse { tokens }))
}
