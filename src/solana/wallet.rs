use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::fs;
use std::path::Path;

use crate::fees::TransactionSigner;

/// Signs claim transactions with a local keypair
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load a wallet from a keypair file, either a JSON byte array or a base58 string
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read keypair file at {:?}", path.as_ref()))?;

        if let Ok(keypair_bytes) = serde_json::from_slice::<Vec<u8>>(&bytes) {
            return Self::from_secret_bytes(&keypair_bytes);
        }

        let encoded = String::from_utf8_lossy(&bytes).trim().to_string();
        let keypair_bytes = bs58::decode(&encoded)
            .into_vec()
            .map_err(|_| anyhow!("Failed to parse keypair file {:?}", path.as_ref()))?;
        Self::from_secret_bytes(&keypair_bytes)
    }

    fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(anyhow!("Keypair must be 64 bytes, got {}", bytes.len()));
        }
        let keypair = Keypair::from_bytes(bytes).map_err(|e| anyhow!("Invalid keypair: {}", e))?;
        Ok(Self { keypair })
    }

    /// Get the public key of the wallet
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Add this wallet's signature to a bincode-serialized transaction.
    /// Other required signatures are left as they are.
    pub fn sign_serialized(&self, unsigned: &[u8]) -> Result<Vec<u8>> {
        let mut transaction: Transaction =
            bincode::deserialize(unsigned).context("Draft is not a legacy transaction")?;
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| anyhow!("Wallet refused to sign: {}", e))?;
        bincode::serialize(&transaction).context("Failed to serialize signed transaction")
    }
}

#[async_trait]
impl TransactionSigner for Wallet {
    async fn sign(&self, unsigned: Vec<u8>) -> Result<Vec<u8>> {
        self.sign_serialized(&unsigned)
    }
}
