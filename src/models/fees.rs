use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::models::Amount;
use crate::utils::serde_pubkey;

/// Unclaimed and lifetime fee amounts for one pool, in minor units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeMetric {
    #[serde(with = "serde_pubkey")]
    pub pool_address: Pubkey,
    pub partner_base_fee: Amount,
    pub partner_quote_fee: Amount,
    pub creator_base_fee: Amount,
    pub creator_quote_fee: Amount,
    pub total_trading_base_fee: Amount,
    pub total_trading_quote_fee: Amount,
}

/// Column sums over a set of fee metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTotals {
    pub partner_base_fee: Amount,
    pub partner_quote_fee: Amount,
    pub creator_base_fee: Amount,
    pub creator_quote_fee: Amount,
    pub total_trading_base_fee: Amount,
    pub total_trading_quote_fee: Amount,
}

/// Counts from one batched claim run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimBatchResult {
    pub success_count: usize,
    pub fail_count: usize,
}

/// Result of a batched claim, distinguishing "nothing was eligible" from a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimBatchOutcome {
    NothingToClaim,
    Completed(ClaimBatchResult),
}
