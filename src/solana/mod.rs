pub mod client;
pub mod rpc_helpers;
pub mod wallet;

pub use client::SolanaClient;
pub use wallet::Wallet;

use crate::config::Config;
use crate::error::ApiError;

/// Create a Solana client from the application configuration
pub fn create_client_from_config(config: &Config) -> Result<SolanaClient, ApiError> {
    Ok(SolanaClient::new(config.rpc_url()?))
}
