use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::exchanges::ForeignVenue;

/// Premium figures for one symbol listed on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumRecord {
    pub symbol: String,
    #[serde(default)]
    pub korean_name: Option<String>,
    pub domestic_krw: Decimal,
    pub domestic_usd: Decimal,
    pub foreign_usd: Decimal,
    /// Kimchi premium, percent.
    pub premium: Decimal,
    /// Premium minus both venues' fees, percent.
    pub net_premium: Decimal,
    /// Premium minus the stablecoin's own premium, percent.
    pub pure_premium: Decimal,
    #[serde(default)]
    pub volume_krw_24h: Option<Decimal>,
}

/// Output of one premium computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumSnapshot {
    pub venue: ForeignVenue,
    pub fx_rate: Decimal,
    /// True when `fx_rate` is the configured fallback rather than a live quote.
    pub fx_fallback: bool,
    pub stable_premium: Decimal,
    pub average_premium: Decimal,
    pub records: Vec<PremiumRecord>,
    pub computed_at: DateTime<Utc>,
}

impl PremiumSnapshot {
    pub fn record(&self, symbol: &str) -> Option<&PremiumRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }
}
