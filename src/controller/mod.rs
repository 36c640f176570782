use actix_web::{error::JsonPayloadError, HttpRequest};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::error::ApiError;

pub mod balance;
pub mod claim;
pub mod fees;
pub mod health;
pub mod pool_by_mint;
pub mod pools;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

/// Parse a required base58 address field from a request body
pub(crate) fn required_address(value: Option<&str>, label: &str) -> Result<Pubkey, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{} is required", label)))?;
    Pubkey::from_str(raw).map_err(|e| ApiError::invalid_field(format!("Invalid {}", label.to_lowercase()), e))
}

/// Parse an optional base58 address field
pub(crate) fn optional_address(value: Option<&str>, label: &str) -> Result<Option<Pubkey>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => Pubkey::from_str(raw)
            .map(Some)
            .map_err(|e| ApiError::invalid_field(format!("Invalid {}", label.to_lowercase()), e)),
    }
}

/// Turn JSON extractor failures into the API's error body
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid_field("Invalid request body", err).into()
}
