//! Byte layouts of the Dynamic Bonding Curve accounts the launchpad reads.
//!
//! Only the leading fields are decoded; borsh stops reading once the struct is filled,
//! so trailing padding and newer fields are ignored.

use anyhow::{anyhow, Context, Result};
use borsh::BorshDeserialize;
use solana_sdk::hash::hashv;
use solana_sdk::pubkey::Pubkey;

use crate::models::{Amount, FeeMetric, PoolRecord};

/// Byte offset of `VirtualPool::config`, including the discriminator
pub const POOL_CONFIG_OFFSET: usize = 8 + 64;
/// Byte offset of `VirtualPool::base_mint`, including the discriminator
pub const POOL_BASE_MINT_OFFSET: usize = 8 + 64 + 32 + 32;

/// First 8 bytes of sha256("account:<name>")
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = hashv(&[format!("account:{}", name).as_bytes()]);
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.to_bytes()[..8]);
    out
}

fn strip_discriminator<'a>(data: &'a [u8], name: &str) -> Result<&'a [u8]> {
    if data.len() < 8 {
        return Err(anyhow!("{} account is too short", name));
    }
    let (head, body) = data.split_at(8);
    if head != account_discriminator(name) {
        return Err(anyhow!("Account is not a {}", name));
    }
    Ok(body)
}

#[derive(Debug, Clone, BorshDeserialize)]
pub struct PoolMetrics {
    pub total_protocol_base_fee: u64,
    pub total_protocol_quote_fee: u64,
    pub total_trading_base_fee: u64,
    pub total_trading_quote_fee: u64,
}

/// Leading fields of the program's `VirtualPool` account
#[derive(Debug, Clone, BorshDeserialize)]
pub struct VirtualPool {
    pub volatility_tracker: [u8; 64],
    pub config: [u8; 32],
    pub creator: [u8; 32],
    pub base_mint: [u8; 32],
    pub base_vault: [u8; 32],
    pub quote_vault: [u8; 32],
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub protocol_base_fee: u64,
    pub protocol_quote_fee: u64,
    pub partner_base_fee: u64,
    pub partner_quote_fee: u64,
    pub sqrt_price: u128,
    pub activation_point: u64,
    pub pool_type: u8,
    pub is_migrated: u8,
    pub is_partner_withdraw_surplus: u8,
    pub is_protocol_withdraw_surplus: u8,
    pub migration_progress: u8,
    pub is_withdraw_leftover: u8,
    pub is_creator_withdraw_surplus: u8,
    pub migration_fee_withdraw_status: u8,
    pub metrics: PoolMetrics,
    pub finish_curve_timestamp: u64,
    pub creator_base_fee: u64,
    pub creator_quote_fee: u64,
}

impl VirtualPool {
    pub const NAME: &'static str = "VirtualPool";

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut body = strip_discriminator(data, Self::NAME)?;
        Self::deserialize(&mut body).context("Failed to decode VirtualPool")
    }

    pub fn config(&self) -> Pubkey {
        Pubkey::new_from_array(self.config)
    }

    pub fn creator(&self) -> Pubkey {
        Pubkey::new_from_array(self.creator)
    }

    pub fn base_mint(&self) -> Pubkey {
        Pubkey::new_from_array(self.base_mint)
    }

    pub fn base_vault(&self) -> Pubkey {
        Pubkey::new_from_array(self.base_vault)
    }

    pub fn quote_vault(&self) -> Pubkey {
        Pubkey::new_from_array(self.quote_vault)
    }

    /// Pool record without metadata; the quote mint lives on the config
    pub fn to_record(&self, address: Pubkey, quote_mint: Pubkey) -> PoolRecord {
        PoolRecord {
            address,
            config: self.config(),
            base_mint: self.base_mint(),
            quote_mint,
            creator: self.creator(),
            base_vault: self.base_vault(),
            quote_vault: self.quote_vault(),
            base_reserve: Amount::from(self.base_reserve),
            quote_reserve: Amount::from(self.quote_reserve),
            is_migrated: self.is_migrated != 0,
            metadata: None,
        }
    }

    pub fn to_fee_metric(&self, address: Pubkey) -> FeeMetric {
        FeeMetric {
            pool_address: address,
            partner_base_fee: Amount::from(self.partner_base_fee),
            partner_quote_fee: Amount::from(self.partner_quote_fee),
            creator_base_fee: Amount::from(self.creator_base_fee),
            creator_quote_fee: Amount::from(self.creator_quote_fee),
            total_trading_base_fee: Amount::from(self.metrics.total_trading_base_fee),
            total_trading_quote_fee: Amount::from(self.metrics.total_trading_quote_fee),
        }
    }
}

/// Leading fields of the program's `PoolConfig` account
#[derive(Debug, Clone, BorshDeserialize)]
pub struct PoolConfig {
    pub quote_mint: [u8; 32],
    pub fee_claimer: [u8; 32],
    pub leftover_receiver: [u8; 32],
}

impl PoolConfig {
    pub const NAME: &'static str = "PoolConfig";

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut body = strip_discriminator(data, Self::NAME)?;
        Self::deserialize(&mut body).context("Failed to decode PoolConfig")
    }

    pub fn quote_mint(&self) -> Pubkey {
        Pubkey::new_from_array(self.quote_mint)
    }

    pub fn fee_claimer(&self) -> Pubkey {
        Pubkey::new_from_array(self.fee_claimer)
    }
}
