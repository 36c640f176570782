use async_trait::async_trait;
use serde::Serialize;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::ApiError;
use crate::fees::ClaimRequest;
use crate::models::{FeeMetric, PoolRecord, TokenAccount, TokenMetadata};

/// Which fee bucket a claim draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    /// The config's fee claimer
    Partner,
    /// The pool creator
    Creator,
}

/// An unsigned claim transaction and the blockhash it was built against
#[derive(Debug, Clone)]
pub struct ClaimDraft {
    pub transaction: Vec<u8>,
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Queries and transaction services the launchpad needs from the chain.
///
/// Implementations report unreachable or malformed remote data as
/// [`ApiError::Transport`].
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn get_pools_by_config(&self, config: &Pubkey) -> Result<Vec<PoolRecord>, ApiError>;

    async fn get_pool_by_base_mint(&self, mint: &Pubkey) -> Result<Option<PoolRecord>, ApiError>;

    async fn get_asset_metadata(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>, ApiError>;

    async fn get_pool_fee_metrics_by_config(&self, config: &Pubkey)
        -> Result<Vec<FeeMetric>, ApiError>;

    async fn build_claim_transaction(
        &self,
        kind: ClaimKind,
        request: &ClaimRequest,
    ) -> Result<ClaimDraft, ApiError>;

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), ApiError>;

    async fn submit_signed_transaction(&self, signed: &[u8]) -> Result<Signature, ApiError>;

    /// Native balance in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ApiError>;

    async fn get_token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>, ApiError>;
}
