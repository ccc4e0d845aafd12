use std::collections::HashMap;

use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;

use super::types::PriceMap;
use super::ExchangeError;

const HYPERLIQUID_API_BASE: &str = "https://api.hyperliquid.xyz";

#[derive(Debug, Clone)]
pub struct HyperliquidClient {
    http: Client,
    base_url: String,
}

impl HyperliquidClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, HYPERLIQUID_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Perp mid prices in USD, keyed by normalized symbol.
    pub async fn fetch_mids(&self) -> Result<PriceMap, ExchangeError> {
        let url = format!("{}/info", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "type": "allMids" }))
            .send()
            .await?
            .error_for_status()?;

        let mids: HashMap<String, Decimal> = resp.json().await?;
        Ok(normalize_mids(mids))
    }
}

pub fn normalize_mids(mids: HashMap<String, Decimal>) -> PriceMap {
    let mut out = PriceMap::with_capacity(mids.len());
    for (coin, px) in mids {
        if let Some((symbol, price)) = normalize_coin(&coin, px) {
            out.insert(symbol, price);
        }
    }
    out
}

/// Spot indices (`@107`) are dropped. Thousand-unit contracts (`kPEPE`) are
/// re-expressed per single unit (`PEPE`, price / 1000).
pub fn normalize_coin(coin: &str, price: Decimal) -> Option<(String, Decimal)> {
    if coin.is_empty() || coin.starts_with('@') {
        return None;
    }

    let mut chars = coin.chars();
    if let (Some('k'), Some(next)) = (chars.next(), chars.next()) {
        if next.is_ascii_uppercase() {
            return Some((coin[1..].to_string(), price / Decimal::from(1000)));
        }
    }

    Some((coin.to_uppercase(), price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_coin_thousand_unit() {
        let (symbol, price) = normalize_coin("kPEPE", Decimal::new(12, 3)).unwrap();
        assert_eq!(symbol, "PEPE");
        assert_eq!(price, Decimal::new(12, 6));
    }

    #[test]
    fn test_normalize_coin_drops_spot_index() {
        assert!(normalize_coin("@107", Decimal::ONE).is_none());
    }

    #[test]
    fn test_normalize_mids() {
        let mut mids = HashMap::new();
        mids.insert("BTC".to_string(), Decimal::from(65_000));
        mids.insert("@1".to_string(), Decimal::ONE);
        let map = normalize_mids(mids);
        assert_eq!(map.len(), 1);
        assert_eq!(map["BTC"], Decimal::from(65_000));
    }
}
