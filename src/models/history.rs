use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for kimp_history table (one aggregate row per snapshot).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KimpHistory {
    pub id: i64,
    pub venue: String,
    pub fx_rate: Decimal,
    pub fx_fallback: bool,
    pub stable_premium: Decimal,
    pub average_premium: Decimal,
    pub btc_premium: Option<Decimal>,
    pub coin_count: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Database row for kimp_coin_history table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KimpCoinHistory {
    pub id: i64,
    pub symbol: String,
    pub venue: String,
    pub domestic_krw: Decimal,
    pub foreign_usd: Decimal,
    pub premium: Decimal,
    pub net_premium: Decimal,
    pub pure_premium: Decimal,
    pub recorded_at: DateTime<Utc>,
}
