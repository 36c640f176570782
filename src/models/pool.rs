use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::models::Amount;
use crate::utils::serde_pubkey;

/// A Dynamic Bonding Curve pool as listed by the launchpad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    #[serde(with = "serde_pubkey")]
    pub address: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub config: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub base_mint: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub quote_mint: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub creator: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub base_vault: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub quote_vault: Pubkey,
    pub base_reserve: Amount,
    pub quote_reserve: Amount,
    pub is_migrated: bool,
    pub metadata: Option<TokenMetadata>,
}

impl PoolRecord {
    /// Attach token metadata, replacing whatever was there
    pub fn with_metadata(mut self, metadata: Option<TokenMetadata>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Display metadata for a pool's base token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}
