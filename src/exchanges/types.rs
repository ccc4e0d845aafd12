use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Normalized symbol (e.g. `BTC`) -> price in the venue's quote currency.
pub type PriceMap = HashMap<String, Decimal>;

// ---------------------------------------------------------------------------
// ForeignVenue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignVenue {
    Binance,
    Hyperliquid,
}

impl ForeignVenue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForeignVenue::Binance => "binance",
            ForeignVenue::Hyperliquid => "hyperliquid",
        }
    }
}

impl fmt::Display for ForeignVenue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForeignVenue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(ForeignVenue::Binance),
            "hyperliquid" | "hl" => Ok(ForeignVenue::Hyperliquid),
            other => Err(format!("unknown venue '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Upbit (REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpbitMarket {
    pub market: String,
    #[serde(default)]
    pub korean_name: Option<String>,
    #[serde(default)]
    pub english_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpbitTicker {
    pub market: String,
    pub trade_price: Decimal,
    #[serde(default)]
    pub acc_trade_price_24h: Option<Decimal>,
    #[serde(default)]
    pub signed_change_rate: Option<Decimal>,
}

/// Domestic KRW board keyed by normalized symbol.
#[derive(Debug, Clone, Default)]
pub struct DomesticBoard {
    pub prices: PriceMap,
    pub names: HashMap<String, String>,
    pub volumes: HashMap<String, Decimal>,
}

// ---------------------------------------------------------------------------
// Binance (REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// FX (open.er-api.com)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FxResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, Decimal>,
}

/// USD -> KRW rate used for a computation, flagged when the configured fallback was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FxRate {
    pub rate: Decimal,
    pub fallback: bool,
}
