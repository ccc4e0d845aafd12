use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Direction;

/// Database row for whale_wallets table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WhaleWallet {
    pub id: Uuid,
    pub address: String,
    pub label: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Database row for whale_alerts table. `tx_hash` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WhaleAlert {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub tx_hash: String,
    pub direction: String,
    pub token: String,
    pub amount: Decimal,
    pub usd_value: Option<Decimal>,
    pub counterparty: Option<String>,
    pub tx_time: Option<DateTime<Utc>>,
    pub detected_at: DateTime<Utc>,
}

/// A qualifying transfer extracted from explorer history, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhaleTransfer {
    pub tx_hash: String,
    pub direction: Direction,
    pub token: String,
    pub amount: Decimal,
    pub usd_value: Option<Decimal>,
    pub counterparty: String,
    pub tx_time: Option<DateTime<Utc>>,
}

/// Summary of one whale check run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WhaleCheckReport {
    pub wallets_checked: usize,
    pub new_alerts: usize,
    pub notified: usize,
    pub errors: usize,
}
