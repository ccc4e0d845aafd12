use reqwest::Client;

use super::types::{BinanceTickerPrice, PriceMap};
use super::ExchangeError;

const BINANCE_API_BASE: &str = "https://api.binance.com";

#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, BINANCE_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Spot prices of every `*USDT` pair, keyed by base asset.
    pub async fn fetch_usdt_prices(&self) -> Result<PriceMap, ExchangeError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let tickers: Vec<BinanceTickerPrice> = resp.json().await?;
        Ok(usdt_price_map(tickers))
    }
}

pub fn usdt_price_map(tickers: Vec<BinanceTickerPrice>) -> PriceMap {
    tickers
        .into_iter()
        .filter_map(|t| normalize_pair(&t.symbol).map(|s| (s, t.price)))
        .collect()
}

/// `BTCUSDT` -> `BTC`. Other quotes are dropped.
pub fn normalize_pair(pair: &str) -> Option<String> {
    pair.strip_suffix("USDT")
        .filter(|base| !base.is_empty())
        .map(str::to_string)
}
