use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::PremiumRecord;

/// Database row for kimp_spike_alerts table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KimpAlert {
    pub id: i64,
    pub kind: String,
    pub symbol: Option<String>,
    pub premium: Option<Decimal>,
    pub previous_premium: Option<Decimal>,
    pub message: String,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Manual,
    Auto,
    Spike,
    Watch,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Manual => "manual",
            AlertKind::Auto => "auto",
            AlertKind::Spike => "spike",
            AlertKind::Watch => "watch",
        }
    }
}

/// A coin whose premium moved sharply since the last recorded snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumSpike {
    pub record: PremiumRecord,
    pub previous_premium: Decimal,
    pub delta: Decimal,
}

/// Result of one alert run, returned by the trigger endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AlertOutcome {
    pub kind: AlertKind,
    pub matched: usize,
    pub sent: bool,
    /// Symbols (or `*` for the aggregate alert) skipped by the repeat window.
    pub suppressed: Vec<String>,
    pub fx_fallback: bool,
    pub records: Vec<PremiumRecord>,
}
