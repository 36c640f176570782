use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cache::{ManualClock, MemoryStore, ReadThroughCache, DEFAULT_TTL_MS};
use crate::config::Config;
use crate::error::ApiError;
use crate::fees::ClaimRequest;
use crate::models::{Amount, FeeMetric, PoolRecord, TokenAccount, TokenMetadata};
use crate::source::{ClaimDraft, ClaimKind, RemoteSource};
use crate::state::State;

/// In-memory chain used by the controller tests
#[derive(Default)]
pub struct FakeSource {
    pub pools: Vec<PoolRecord>,
    pub fees: Vec<FeeMetric>,
    pub balance: u64,
    pub fee_claimer: Option<Pubkey>,
    pub fail_pools: bool,
    pub pool_calls: AtomicUsize,
    pub claims: Mutex<Vec<(ClaimKind, ClaimRequest)>>,
}

impl FakeSource {
    pub fn pool_calls(&self) -> usize {
        self.pool_calls.load(Ordering::SeqCst)
    }
}

pub fn pool(base_mint: Pubkey) -> PoolRecord {
    PoolRecord {
        address: Pubkey::new_unique(),
        config: Pubkey::new_unique(),
        base_mint,
        quote_mint: Pubkey::new_unique(),
        creator: Pubkey::new_unique(),
        base_vault: Pubkey::new_unique(),
        quote_vault: Pubkey::new_unique(),
        base_reserve: Amount::from(1_000),
        quote_reserve: Amount::from(5),
        is_migrated: false,
        metadata: None,
    }
}

pub fn fee(partner_quote_fee: u64) -> FeeMetric {
    FeeMetric {
        pool_address: Pubkey::new_unique(),
        partner_base_fee: Amount::from(1),
        partner_quote_fee: Amount::from(partner_quote_fee),
        creator_base_fee: Amount::from(2),
        creator_quote_fee: Amount::from(3),
        total_trading_base_fee: Amount::from(4),
        total_trading_quote_fee: Amount::from(5),
    }
}

pub fn configured() -> Config {
    Config {
        rpc_url: Some("http://localhost:8899".to_string()),
        pool_config_key: Some(Pubkey::new_unique().to_string()),
        ..Config::default()
    }
}

/// State over a fake source and a manually driven clock
pub fn state_with(config: Config, source: Arc<FakeSource>, clock: Arc<ManualClock>) -> State {
    let cache = ReadThroughCache::new(MemoryStore::new(), clock, DEFAULT_TTL_MS);
    State::with_cache(config, Some(source as Arc<dyn RemoteSource>), cache)
}

#[async_trait]
impl RemoteSource for FakeSource {
    async fn get_pools_by_config(&self, _config: &Pubkey) -> Result<Vec<PoolRecord>, ApiError> {
        self.pool_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pools {
            return Err(ApiError::transport("Failed to fetch pools", "connection refused"));
        }
        Ok(self.pools.clone())
    }

    async fn get_pool_by_base_mint(&self, mint: &Pubkey) -> Result<Option<PoolRecord>, ApiError> {
        Ok(self.pools.iter().find(|p| p.base_mint == *mint).cloned())
    }

    async fn get_asset_metadata(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>, ApiError> {
        Ok(Some(TokenMetadata {
            name: Some(format!("Token {}", &mint.to_string()[..4])),
            symbol: Some("TKN".to_string()),
            website: None,
            logo: None,
        }))
    }

    async fn get_pool_fee_metrics_by_config(&self, _config: &Pubkey) -> Result<Vec<FeeMetric>, ApiError> {
        Ok(self.fees.clone())
    }

    async fn build_claim_transaction(
        &self,
        kind: ClaimKind,
        request: &ClaimRequest,
    ) -> Result<ClaimDraft, ApiError> {
        if let Some(expected) = self.fee_claimer {
            if expected != request.claimer {
                return Err(ApiError::Authorization("claimer mismatch".to_string()));
            }
        }
        self.claims.lock().unwrap().push((kind, request.clone()));
        Ok(ClaimDraft {
            transaction: vec![1, 2, 3],
            blockhash: Hash::default(),
            last_valid_block_height: 77,
        })
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), ApiError> {
        Ok((Hash::default(), 77))
    }

    async fn submit_signed_transaction(&self, _signed: &[u8]) -> Result<Signature, ApiError> {
        Ok(Signature::default())
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, ApiError> {
        Ok(self.balance)
    }

    async fn get_token_accounts(&self, _owner: &Pubkey) -> Result<Vec<TokenAccount>, ApiError> {
        Ok(vec![TokenAccount {
            pubkey: Pubkey::new_unique().to_string(),
            mint: Pubkey::new_unique().to_string(),
            amount: Amount::from(42),
            decimals: 6,
            ui_amount: Some(0.000042),
        }])
    }
}
