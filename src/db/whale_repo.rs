use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{WhaleAlert, WhaleTransfer, WhaleWallet};

/// Track a wallet, or re-activate and relabel it if already known.
pub async fn upsert_wallet(
    pool: &PgPool,
    address: &str,
    label: Option<&str>,
    notes: Option<&str>,
) -> anyhow::Result<WhaleWallet> {
    let wallet = sqlx::query_as::<_, WhaleWallet>(
        r#"
        INSERT INTO whale_wallets (address, label, notes)
        VALUES ($1, $2, $3)
        ON CONFLICT (address) DO UPDATE
            SET label = COALESCE(EXCLUDED.label, whale_wallets.label),
                notes = COALESCE(EXCLUDED.notes, whale_wallets.notes),
                is_active = true
        RETURNING *
        "#,
    )
    .bind(address.to_lowercase())
    .bind(label)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(wallet)
}

/// Fetch all active wallets.
pub async fn get_active_wallets(pool: &PgPool) -> anyhow::Result<Vec<WhaleWallet>> {
    let wallets = sqlx::query_as::<_, WhaleWallet>(
        "SELECT * FROM whale_wallets WHERE is_active = true ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(wallets)
}

/// Stop tracking a wallet. Returns false if no such wallet exists.
pub async fn deactivate_wallet(pool: &PgPool, wallet_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("UPDATE whale_wallets SET is_active = false WHERE id = $1")
        .bind(wallet_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record a transfer unless its hash was already recorded.
/// Returns `None` for a duplicate hash.
pub async fn insert_alert_if_new(
    pool: &PgPool,
    wallet_id: Uuid,
    transfer: &WhaleTransfer,
) -> anyhow::Result<Option<WhaleAlert>> {
    let alert = sqlx::query_as::<_, WhaleAlert>(
        r#"
        INSERT INTO whale_alerts
            (wallet_id, tx_hash, direction, token, amount, usd_value, counterparty, tx_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (tx_hash) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(wallet_id)
    .bind(&transfer.tx_hash)
    .bind(transfer.direction.as_str())
    .bind(&transfer.token)
    .bind(transfer.amount)
    .bind(transfer.usd_value)
    .bind(&transfer.counterparty)
    .bind(transfer.tx_time)
    .fetch_optional(pool)
    .await?;

    Ok(alert)
}

pub async fn recent_alerts(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<WhaleAlert>> {
    let alerts = sqlx::query_as::<_, WhaleAlert>(
        "SELECT * FROM whale_alerts ORDER BY detected_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}
