use anyhow::{anyhow, Context, Result};
use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::models::Amount;

/// Convert a string to a Pubkey
pub fn pubkey_from_str(pubkey_str: &str) -> Result<Pubkey> {
    Pubkey::from_str(pubkey_str.trim())
        .with_context(|| format!("Invalid public key: {}", pubkey_str))
}

/// Convert lamports to SOL for display
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a decimal SOL string ("0.1") into an exact lamport amount.
/// Digits beyond nine decimal places are truncated.
pub fn sol_to_lamports(sol: &str) -> Result<Amount> {
    let value = BigDecimal::from_str(sol.trim())
        .with_context(|| format!("Invalid SOL amount: {}", sol))?;
    let (lamports, _) = value.with_scale(9).into_bigint_and_exponent();
    let lamports = lamports
        .to_biguint()
        .ok_or_else(|| anyhow!("SOL amount must not be negative: {}", sol))?;
    Ok(Amount::from(lamports))
}

/// Format a minor-unit amount with the given number of decimals, without floats
pub fn format_units(amount: &Amount, decimals: u32) -> String {
    let base = BigUint::from(10u32).pow(decimals);
    let raw = amount.as_biguint();
    let whole = raw / &base;
    let frac = raw % &base;
    if decimals == 0 {
        return whole.to_string();
    }
    format!("{}.{:0>width$}", whole, frac.to_string(), width = decimals as usize)
}
