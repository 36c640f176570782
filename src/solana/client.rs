use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;
use std::sync::Arc;

use crate::fees::TransactionSubmitter;
use crate::models::{Amount, TokenAccount};

pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Thin async wrapper around the Solana RPC client
#[derive(Clone)]
pub struct SolanaClient {
    rpc_client: Arc<RpcClient>,
}

impl SolanaClient {
    /// Create a new Solana client with the given RPC URL
    pub fn new(rpc_url: &str) -> Self {
        let commitment = CommitmentConfig::confirmed();
        let rpc_client = RpcClient::new_with_commitment(rpc_url.to_string(), commitment);

        Self { rpc_client: Arc::new(rpc_client) }
    }

    /// Get the balance of an address in lamports
    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        debug!("Getting balance for {}", address);
        self.rpc_client
            .get_balance(address)
            .await
            .with_context(|| format!("Failed to get balance for {}", address))
    }

    /// Latest blockhash and the last block height it stays valid for
    pub async fn get_latest_blockhash(&self) -> Result<(Hash, u64)> {
        self.rpc_client
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .context("Failed to get latest blockhash")
    }

    pub async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .with_context(|| format!("Failed to fetch account {}", address))?;
        Ok(response.value)
    }

    pub async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        self.rpc_client
            .get_multiple_accounts(addresses)
            .await
            .context("Failed to fetch accounts")
    }

    /// Fetch all accounts of `program_id` matching every filter
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(CommitmentConfig::confirmed()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .rpc_client
            .get_program_accounts_with_config(program_id, config)
            .await
            .with_context(|| format!("Failed to fetch accounts of program {}", program_id))?;
        debug!("Found {} accounts for program {}", accounts.len(), program_id);
        Ok(accounts)
    }

    /// SPL Token and Token-2022 accounts owned by `owner`
    pub async fn get_token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>> {
        let mut tokens = Vec::new();
        for program_id in [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID] {
            let response: serde_json::Value = self
                .rpc_client
                .send(
                    RpcRequest::GetTokenAccountsByOwner,
                    json!([
                        owner.to_string(),
                        { "programId": program_id },
                        { "encoding": "jsonParsed", "commitment": "confirmed" }
                    ]),
                )
                .await
                .with_context(|| format!("Failed to list token accounts for {}", owner))?;
            tokens.extend(parse_token_accounts(&response)?);
        }
        Ok(tokens)
    }

    /// Send a transaction and wait for confirmation
    pub async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        self.rpc_client
            .send_and_confirm_transaction(transaction)
            .await
            .context("Failed to send transaction")
    }

    /// Send a bincode-serialized, signed transaction
    pub async fn send_serialized(&self, signed: &[u8]) -> Result<Signature> {
        let transaction: Transaction =
            bincode::deserialize(signed).context("Signed transaction is not decodable")?;
        self.send_and_confirm(&transaction).await
    }
}

#[async_trait]
impl TransactionSubmitter for SolanaClient {
    async fn submit(&self, signed: Vec<u8>) -> Result<Signature> {
        self.send_serialized(&signed).await
    }
}

/// Pull token balances out of a jsonParsed `getTokenAccountsByOwner` response
fn parse_token_accounts(response: &serde_json::Value) -> Result<Vec<TokenAccount>> {
    let entries = response
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("Malformed token account response"))?;

    entries
        .iter()
        .map(|entry| -> Result<TokenAccount> {
            let pubkey = entry["pubkey"]
                .as_str()
                .ok_or_else(|| anyhow!("Token account without pubkey"))?;
            let info = &entry["account"]["data"]["parsed"]["info"];
            let mint = info["mint"]
                .as_str()
                .ok_or_else(|| anyhow!("Token account {} without mint", pubkey))?;
            let token_amount = &info["tokenAmount"];
            let amount = token_amount["amount"]
                .as_str()
                .ok_or_else(|| anyhow!("Token account {} without amount", pubkey))
                .and_then(|raw| {
                    Amount::from_str(raw).map_err(|e| anyhow!("Bad amount {}: {}", raw, e))
                })?;
            let decimals = token_amount["decimals"].as_u64().unwrap_or(0) as u8;

            Ok(TokenAccount {
                pubkey: pubkey.to_string(),
                mint: mint.to_string(),
                amount,
                decimals,
                ui_amount: token_amount["uiAmount"].as_f64(),
            })
        })
        .collect()
}
