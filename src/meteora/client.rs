use async_trait::async_trait;
use log::{debug, info, warn};
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::fees::ClaimRequest;
use crate::meteora::accounts::{
    account_discriminator, PoolConfig, VirtualPool, POOL_BASE_MINT_OFFSET, POOL_CONFIG_OFFSET,
};
use crate::meteora::instructions::{claim_instructions, ClaimAccounts};
use crate::meteora::metadata::{decode_metadata_account, enrich_from_uri, metadata_address};
use crate::models::{FeeMetric, PoolRecord, TokenAccount, TokenMetadata};
use crate::solana::rpc_helpers::{memcmp_discriminator, memcmp_pubkey};
use crate::solana::SolanaClient;
use crate::source::{ClaimDraft, ClaimKind, RemoteSource};
use crate::utils::format_pubkey;

/// Meteora Dynamic Bonding Curve program ID
pub const DBC_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("dbcij3LWUppWqq96dh6gJWwBifmcGfLSB5D4DuSMaqN");

fn transport(message: &str) -> impl Fn(anyhow::Error) -> ApiError + '_ {
    move |e| ApiError::transport(message, format!("{:#}", e))
}

/// Client for Dynamic Bonding Curve pools, reading through Solana RPC
pub struct DbcClient {
    client: SolanaClient,
    http: reqwest::Client,
    program_id: Pubkey,
}

impl DbcClient {
    /// Create a new DBC client
    pub fn new(client: SolanaClient) -> Self {
        Self {
            client,
            http: reqwest::Client::new(),
            program_id: DBC_PROGRAM_ID,
        }
    }

    async fn pool_accounts(&self, offset: usize, key: &Pubkey) -> Result<Vec<(Pubkey, VirtualPool)>, ApiError> {
        let filters = vec![
            memcmp_discriminator(&account_discriminator(VirtualPool::NAME)),
            memcmp_pubkey(offset, key),
        ];
        let accounts = self
            .client
            .get_program_accounts(&self.program_id, filters)
            .await
            .map_err(transport("Failed to fetch pools"))?;

        let mut pools = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            match VirtualPool::decode(&account.data) {
                Ok(pool) => pools.push((address, pool)),
                Err(e) => warn!("Skipping undecodable pool {}: {}", address, e),
            }
        }
        Ok(pools)
    }

    async fn load_config(&self, config: &Pubkey) -> Result<PoolConfig, ApiError> {
        let account = self
            .client
            .get_account(config)
            .await
            .map_err(transport("Failed to fetch pool config"))?
            .ok_or_else(|| ApiError::NotFound(format!("Pool config {} not found", config)))?;
        PoolConfig::decode(&account.data)
            .map_err(|e| ApiError::transport("Malformed pool config", format!("{:#}", e)))
    }

    /// Quote mints keyed by config, one RPC round trip for all distinct configs
    async fn quote_mints(&self, configs: &[Pubkey]) -> Result<HashMap<Pubkey, Pubkey>, ApiError> {
        let mut unique = configs.to_vec();
        unique.sort();
        unique.dedup();

        let accounts = self
            .client
            .get_multiple_accounts(&unique)
            .await
            .map_err(transport("Failed to fetch pool configs"))?;

        let mut mints = HashMap::new();
        for (config, account) in unique.iter().zip(accounts) {
            let Some(account) = account else {
                warn!("Pool config {} not found", config);
                continue;
            };
            match PoolConfig::decode(&account.data) {
                Ok(decoded) => {
                    mints.insert(*config, decoded.quote_mint());
                }
                Err(e) => warn!("Skipping malformed pool config {}: {}", config, e),
            }
        }
        Ok(mints)
    }

    /// Owning token program of each mint
    async fn token_programs(&self, mints: [Pubkey; 2]) -> Result<[Pubkey; 2], ApiError> {
        let accounts = self
            .client
            .get_multiple_accounts(&mints)
            .await
            .map_err(transport("Failed to fetch mints"))?;

        let mut owners = [Pubkey::default(); 2];
        for (i, account) in accounts.into_iter().enumerate().take(2) {
            let account = account
                .ok_or_else(|| ApiError::NotFound(format!("Mint {} not found", mints[i])))?;
            owners[i] = account.owner;
        }
        Ok(owners)
    }
}

#[async_trait]
impl RemoteSource for DbcClient {
    async fn get_pools_by_config(&self, config: &Pubkey) -> Result<Vec<PoolRecord>, ApiError> {
        let pools = self.pool_accounts(POOL_CONFIG_OFFSET, config).await?;
        let quote_mint = self.load_config(config).await?.quote_mint();
        info!("Fetched {} pools for config {}", pools.len(), format_pubkey(config));

        Ok(pools
            .into_iter()
            .map(|(address, pool)| pool.to_record(address, quote_mint))
            .collect())
    }

    async fn get_pool_by_base_mint(&self, mint: &Pubkey) -> Result<Option<PoolRecord>, ApiError> {
        let pools = self.pool_accounts(POOL_BASE_MINT_OFFSET, mint).await?;
        let configs: Vec<Pubkey> = pools.iter().map(|(_, pool)| pool.config()).collect();
        if configs.is_empty() {
            return Ok(None);
        }
        let quote_mints = self.quote_mints(&configs).await?;

        Ok(pools.into_iter().find_map(|(address, pool)| {
            let quote_mint = quote_mints.get(&pool.config())?;
            Some(pool.to_record(address, *quote_mint))
        }))
    }

    async fn get_asset_metadata(&self, mint: &Pubkey) -> Result<Option<TokenMetadata>, ApiError> {
        let address = metadata_address(mint);
        let Some(account) = self
            .client
            .get_account(&address)
            .await
            .map_err(transport("Failed to fetch token metadata"))?
        else {
            debug!("No metadata account for mint {}", mint);
            return Ok(None);
        };

        let (mut metadata, uri) = decode_metadata_account(&account.data)
            .map_err(|e| ApiError::transport("Malformed token metadata", format!("{:#}", e)))?;
        if let Some(uri) = uri {
            enrich_from_uri(&self.http, &mut metadata, &uri).await;
        }
        Ok(Some(metadata))
    }

    async fn get_pool_fee_metrics_by_config(&self, config: &Pubkey) -> Result<Vec<FeeMetric>, ApiError> {
        let pools = self.pool_accounts(POOL_CONFIG_OFFSET, config).await?;
        Ok(pools
            .iter()
            .map(|(address, pool)| pool.to_fee_metric(*address))
            .collect())
    }

    async fn build_claim_transaction(
        &self,
        kind: ClaimKind,
        request: &ClaimRequest,
    ) -> Result<ClaimDraft, ApiError> {
        let account = self
            .client
            .get_account(&request.pool)
            .await
            .map_err(transport("Failed to fetch pool"))?
            .ok_or_else(|| ApiError::NotFound(format!("Pool {} not found", request.pool)))?;
        let pool = VirtualPool::decode(&account.data)
            .map_err(|e| ApiError::transport("Malformed pool account", format!("{:#}", e)))?;
        let config = self.load_config(&pool.config()).await?;

        let expected = match kind {
            ClaimKind::Partner => config.fee_claimer(),
            ClaimKind::Creator => pool.creator(),
        };
        if expected != request.claimer {
            return Err(ApiError::Authorization(format!(
                "{} is not the {:?} fee claimer of pool {}",
                request.claimer, kind, request.pool
            )));
        }

        let quote_mint = config.quote_mint();
        let [base_token_program, quote_token_program] =
            self.token_programs([pool.base_mint(), quote_mint]).await?;

        let accounts = ClaimAccounts {
            program_id: self.program_id,
            pool: request.pool,
            config: pool.config(),
            base_mint: pool.base_mint(),
            quote_mint,
            base_vault: pool.base_vault(),
            quote_vault: pool.quote_vault(),
            base_token_program,
            quote_token_program,
            claimer: request.claimer,
            payer: request.payer,
            receiver: request.receiver.unwrap_or(request.claimer),
        };
        let instructions = claim_instructions(
            kind,
            &accounts,
            request.max_base.to_u64_saturating(),
            request.max_quote.to_u64_saturating(),
        );

        let (blockhash, last_valid_block_height) = self.get_latest_blockhash().await?;
        let message = Message::new_with_blockhash(&instructions, Some(&request.payer), &blockhash);
        let transaction = bincode::serialize(&Transaction::new_unsigned(message))
            .map_err(|e| ApiError::transport("Failed to serialize claim transaction", e))?;

        debug!(
            "Drafted {:?} claim for pool {} ({} bytes)",
            kind,
            format_pubkey(&request.pool),
            transaction.len()
        );
        Ok(ClaimDraft {
            transaction,
            blockhash,
            last_valid_block_height,
        })
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), ApiError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(transport("Failed to get latest blockhash"))
    }

    async fn submit_signed_transaction(&self, signed: &[u8]) -> Result<Signature, ApiError> {
        self.client
            .send_serialized(signed)
            .await
            .map_err(transport("Failed to submit transaction"))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ApiError> {
        self.client
            .get_balance(address)
            .await
            .map_err(transport("Failed to fetch balance"))
    }

    async fn get_token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>, ApiError> {
        self.client
            .get_token_accounts(owner)
            .await
            .map_err(transport("Failed to fetch token accounts"))
    }
}
