pub mod binance;
pub mod fx;
pub mod hyperliquid;
pub mod types;
pub mod upbit;

pub use binance::BinanceClient;
pub use fx::{resolve_fx, FxClient};
pub use hyperliquid::HyperliquidClient;
pub use types::{DomesticBoard, ForeignVenue, FxRate, PriceMap};
pub use upbit::UpbitClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}
