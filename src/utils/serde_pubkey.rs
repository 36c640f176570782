//! Serde helpers that read and write a `Pubkey` as its base58 string.

use serde::{de, Deserialize, Deserializer, Serializer};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(pubkey)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Pubkey::from_str(&raw).map_err(|e| de::Error::custom(format!("invalid pubkey {}: {}", raw, e)))
}
