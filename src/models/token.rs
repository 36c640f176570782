use serde::{Deserialize, Serialize};

use crate::models::Amount;

/// An SPL token account held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccount {
    pub pubkey: String,
    pub mint: String,
    pub amount: Amount,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}
