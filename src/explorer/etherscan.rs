use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{ExplorerEnvelope, NativeTx, TokenTx};

const ETHERSCAN_API_BASE: &str = "https://api.etherscan.io/v2/api";
const ETHEREUM_CHAIN_ID: &str = "1";

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer returned error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self::with_base_url(http, ETHERSCAN_API_BASE, api_key)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Most recent native ETH transfers, newest first.
    pub async fn native_transfers(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<NativeTx>, ExplorerError> {
        self.account_list("txlist", address, limit).await
    }

    /// Most recent ERC-20 transfers, newest first.
    pub async fn token_transfers(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<TokenTx>, ExplorerError> {
        self.account_list("tokentx", address, limit).await
    }

    async fn account_list<T: DeserializeOwned>(
        &self,
        action: &str,
        address: &str,
        limit: u32,
    ) -> Result<Vec<T>, ExplorerError> {
        let limit = limit.to_string();
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("chainid", ETHEREUM_CHAIN_ID),
                ("module", "account"),
                ("action", action),
                ("address", address),
                ("page", "1"),
                ("offset", limit.as_str()),
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let envelope: ExplorerEnvelope = resp.json().await?;
        parse_envelope(envelope)
    }
}

/// Status "0" with "No transactions found" is an empty history, not an error.
pub fn parse_envelope<T: DeserializeOwned>(envelope: ExplorerEnvelope) -> Result<Vec<T>, ExplorerError> {
    if envelope.status != "1" {
        if envelope.message.starts_with("No transactions found") {
            return Ok(Vec::new());
        }
        let detail = envelope
            .result
            .as_str()
            .map(str::to_string)
            .unwrap_or(envelope.message);
        return Err(ExplorerError::Api(detail));
    }

    serde_json::from_value(envelope.result).map_err(|e| ExplorerError::Unexpected(e.to_string()))
}
