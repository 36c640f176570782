use anyhow::{Context, Result};
use borsh::BorshDeserialize;
use log::debug;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;

use crate::models::TokenMetadata;
use crate::solana::rpc_helpers::find_pda;

pub const METADATA_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

const OFFCHAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Metadata account address for a mint
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    find_pda(
        &[b"metadata", METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM_ID,
    )
}

/// Leading fields of a token metadata account
#[derive(Debug, BorshDeserialize)]
struct OnChainMetadata {
    _key: u8,
    _update_authority: [u8; 32],
    _mint: [u8; 32],
    name: String,
    symbol: String,
    uri: String,
}

/// Name, symbol and off-chain URI from a metadata account
pub fn decode_metadata_account(data: &[u8]) -> Result<(TokenMetadata, Option<String>)> {
    let mut buf = data;
    let raw = OnChainMetadata::deserialize(&mut buf).context("Failed to decode token metadata")?;

    let clean = |s: String| {
        let trimmed = s.trim_end_matches('\0').trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    let metadata = TokenMetadata {
        name: clean(raw.name),
        symbol: clean(raw.symbol),
        website: None,
        logo: None,
    };
    Ok((metadata, clean(raw.uri)))
}

#[derive(Debug, Default, Deserialize)]
struct OffChainJson {
    image: Option<String>,
    website: Option<String>,
    external_url: Option<String>,
    #[serde(default)]
    extensions: Option<OffChainExtensions>,
}

#[derive(Debug, Default, Deserialize)]
struct OffChainExtensions {
    website: Option<String>,
}

/// Fill `website` and `logo` from the token's JSON document
pub fn apply_offchain(metadata: &mut TokenMetadata, body: &str) -> Result<()> {
    let json: OffChainJson = serde_json::from_str(body).context("Malformed token JSON")?;
    metadata.logo = json.image;
    metadata.website = json
        .website
        .or(json.external_url)
        .or(json.extensions.and_then(|e| e.website));
    Ok(())
}

/// Download the off-chain JSON document. Failures leave the on-chain fields alone.
pub async fn enrich_from_uri(http: &reqwest::Client, metadata: &mut TokenMetadata, uri: &str) {
    let body = http
        .get(uri)
        .timeout(OFFCHAIN_TIMEOUT)
        .send()
        .await
        .and_then(|r| r.error_for_status());
    let body = match body {
        Ok(response) => response.text().await,
        Err(e) => Err(e),
    };

    match body {
        Ok(text) => {
            if let Err(e) = apply_offchain(metadata, &text) {
                debug!("Ignoring token JSON at {}: {}", uri, e);
            }
        }
        Err(e) => debug!("Could not fetch token JSON at {}: {}", uri, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsh::BorshSerialize;

    #[derive(BorshSerialize)]
    struct Fixture {
        key: u8,
        update_authority: [u8; 32],
        mint: [u8; 32],
        name: String,
        symbol: String,
        uri: String,
    }

    #[test]
    fn strips_padding_from_on_chain_strings() {
        let fixture = Fixture {
            key: 4,
            update_authority: [1; 32],
            mint: [2; 32],
            name: format!("Launch Cat{}", "\0".repeat(22)),
            symbol: format!("LCAT{}", "\0".repeat(6)),
            uri: "\0".repeat(200),
        };
        let mut data = borsh::to_vec(&fixture).unwrap();
        data.extend_from_slice(&[0u8; 40]);

        let (metadata, uri) = decode_metadata_account(&data).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Launch Cat"));
        assert_eq!(metadata.symbol.as_deref(), Some("LCAT"));
        assert!(uri.is_none());
    }

    #[test]
    fn prefers_explicit_website_over_external_url() {
        let mut metadata = TokenMetadata::default();
        apply_offchain(
            &mut metadata,
            r#"{"image":"https://img/x.png","external_url":"https://ext","website":"https://site"}"#,
        )
        .unwrap();
        assert_eq!(metadata.logo.as_deref(), Some("https://img/x.png"));
        assert_eq!(metadata.website.as_deref(), Some("https://site"));

        let mut metadata = TokenMetadata::default();
        apply_offchain(&mut metadata, r#"{"extensions":{"website":"https://ext-site"}}"#).unwrap();
        assert_eq!(metadata.website.as_deref(), Some("https://ext-site"));
        assert!(metadata.logo.is_none());
    }
}
