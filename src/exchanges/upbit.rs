use futures_util::future::try_join_all;
use reqwest::Client;

use super::types::{DomesticBoard, UpbitMarket, UpbitTicker};
use super::ExchangeError;

const UPBIT_API_BASE: &str = "https://api.upbit.com";

/// Upbit rejects ticker requests with too many markets in the query string.
const TICKER_CHUNK: usize = 100;

#[derive(Debug, Clone)]
pub struct UpbitClient {
    http: Client,
    base_url: String,
}

impl UpbitClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, UPBIT_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// List all KRW-quoted markets from the market-listing endpoint.
    pub async fn list_krw_markets(&self) -> Result<Vec<UpbitMarket>, ExchangeError> {
        let url = format!("{}/v1/market/all", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("isDetails", "false")])
            .send()
            .await?
            .error_for_status()?;

        let markets: Vec<UpbitMarket> = resp.json().await?;
        Ok(markets
            .into_iter()
            .filter(|m| m.market.starts_with("KRW-"))
            .collect())
    }

    /// Fetch tickers for every KRW market and key them by normalized symbol.
    pub async fn fetch_krw_board(&self) -> Result<DomesticBoard, ExchangeError> {
        let markets = self.list_krw_markets().await?;
        if markets.is_empty() {
            return Err(ExchangeError::Unexpected("Upbit returned no KRW markets".into()));
        }

        let mut board = DomesticBoard::default();
        for m in &markets {
            if let (Some(symbol), Some(name)) = (normalize_market(&m.market), m.korean_name.as_ref()) {
                board.names.insert(symbol, name.clone());
            }
        }

        let codes: Vec<&str> = markets.iter().map(|m| m.market.as_str()).collect();
        let batches = try_join_all(codes.chunks(TICKER_CHUNK).map(|chunk| self.fetch_tickers(chunk))).await?;
        for tickers in batches {
            for t in tickers {
                let Some(symbol) = normalize_market(&t.market) else {
                    continue;
                };
                if let Some(vol) = t.acc_trade_price_24h {
                    board.volumes.insert(symbol.clone(), vol);
                }
                board.prices.insert(symbol, t.trade_price);
            }
        }

        tracing::debug!(markets = board.prices.len(), "Fetched Upbit KRW board");
        Ok(board)
    }

    async fn fetch_tickers(&self, markets: &[&str]) -> Result<Vec<UpbitTicker>, ExchangeError> {
        let url = format!("{}/v1/ticker", self.base_url);
        let joined = markets.join(",");
        let resp = self
            .http
            .get(&url)
            .query(&[("markets", joined.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let tickers: Vec<UpbitTicker> = resp.json().await?;
        Ok(tickers)
    }
}

/// `KRW-BTC` -> `BTC`. Non-KRW markets yield `None`.
pub fn normalize_market(market: &str) -> Option<String> {
    market
        .strip_prefix("KRW-")
        .filter(|s| !s.is_empty())
        .map(|s| s.to_uppercase())
}
