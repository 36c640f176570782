//! HTTP client the dashboard uses to talk to the fee desk server.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;

use crate::fees::{ClaimRequest, TransactionDrafter};
use crate::models::{FeeMetric, FeeTotals, PoolRecord, TokenAccount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolsPage {
    pub pools: Vec<PoolRecord>,
    pub count: usize,
    pub cached: bool,
    pub cache_age: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesPage {
    pub fees: Vec<FeeMetric>,
    pub config_address: String,
    pub totals: FeeTotals,
}

#[derive(Debug, Deserialize)]
struct BalanceBody {
    balance: f64,
}

#[derive(Debug, Deserialize)]
struct TokensBody {
    tokens: Vec<TokenAccount>,
}

#[derive(Debug, Deserialize)]
struct DraftBody {
    transaction: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimPayload<'a> {
    pool_address: String,
    claimer_address: String,
    payer_address: String,
    max_base_amount: &'a crate::models::Amount,
    max_quote_amount: &'a crate::models::Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver_address: Option<String>,
}

impl<'a> From<&'a ClaimRequest> for ClaimPayload<'a> {
    fn from(request: &'a ClaimRequest) -> Self {
        Self {
            pool_address: request.pool.to_string(),
            claimer_address: request.claimer.to_string(),
            payer_address: request.payer.to_string(),
            max_base_amount: &request.max_base,
            max_quote_amount: &request.max_quote,
            receiver_address: request.receiver.map(|r| r.to_string()),
        }
    }
}

/// Typed wrapper over the server's `/api` routes
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn pools(&self, refresh: bool) -> Result<PoolsPage> {
        let url = if refresh { self.endpoint("pools?refresh=true") } else { self.endpoint("pools") };
        debug!("GET {}", url);
        let response = self.http.get(url).send().await.context("Failed to reach server")?;
        decode(response).await
    }

    pub async fn fees(&self) -> Result<FeesPage> {
        let response = self
            .http
            .get(self.endpoint("fees"))
            .send()
            .await
            .context("Failed to reach server")?;
        decode(response).await
    }

    /// Balance in SOL
    pub async fn balance(&self, address: &Pubkey) -> Result<f64> {
        let body: BalanceBody = self.post("balance", &json!({ "address": address.to_string() })).await?;
        Ok(body.balance)
    }

    pub async fn tokens(&self, address: &Pubkey) -> Result<Vec<TokenAccount>> {
        let body: TokensBody = self.post("tokens", &json!({ "address": address.to_string() })).await?;
        Ok(body.tokens)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await.context("Failed to reach server")?;
        decode(response).await
    }
}

/// Turns a server response into `T`, or its `{error, details}` body into an error
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.context("Failed to read server response")?;
    if status.is_success() {
        return serde_json::from_slice(&bytes).context("Unexpected server response");
    }
    Err(error_from_body(status.as_u16(), &bytes))
}

fn error_from_body(status: u16, bytes: &[u8]) -> anyhow::Error {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(ErrorBody { error, details: Some(details) }) => anyhow!("{} ({}): {}", error, status, details),
        Ok(ErrorBody { error, details: None }) => anyhow!("{} ({})", error, status),
        Err(_) => anyhow!("Server returned {}", status),
    }
}

/// Drafts partner claims through the server's `/claim/partner` route
pub struct HttpDrafter {
    api: ApiClient,
}

impl HttpDrafter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TransactionDrafter for HttpDrafter {
    async fn draft_claim(&self, request: &ClaimRequest) -> Result<Vec<u8>> {
        let body: DraftBody = self.api.post("claim/partner", &ClaimPayload::from(request)).await?;
        STANDARD
            .decode(body.transaction.as_bytes())
            .context("Server returned a transaction that is not base64")
    }
}
