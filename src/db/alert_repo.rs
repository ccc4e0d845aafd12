use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{AlertKind, KimpAlert};

pub struct NewAlert<'a> {
    pub kind: AlertKind,
    pub symbol: Option<&'a str>,
    pub premium: Option<Decimal>,
    pub previous_premium: Option<Decimal>,
    pub message: &'a str,
    pub sent: bool,
}

fn run_lock_key(kind: AlertKind) -> i64 {
    const BASE: i64 = 0x6b69_6d70_0000; // "kimp"
    BASE + match kind {
        AlertKind::Manual => 0,
        AlertKind::Auto => 1,
        AlertKind::Spike => 2,
        AlertKind::Watch => 3,
    }
}

/// Take the advisory lock for runs of `kind`. The lock lives as long as the
/// returned transaction; `None` if another session holds it.
pub async fn try_lock_run(
    pool: &PgPool,
    kind: AlertKind,
) -> anyhow::Result<Option<Transaction<'static, Postgres>>> {
    let mut tx = pool.begin().await?;
    let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_xact_lock($1)")
        .bind(run_lock_key(kind))
        .fetch_one(&mut *tx)
        .await?;

    Ok(locked.then_some(tx))
}

pub async fn insert_alert(pool: &PgPool, alert: NewAlert<'_>) -> anyhow::Result<KimpAlert> {
    let row = sqlx::query_as::<_, KimpAlert>(
        r#"
        INSERT INTO kimp_spike_alerts (kind, symbol, premium, previous_premium, message, sent)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(alert.kind.as_str())
    .bind(alert.symbol)
    .bind(alert.premium)
    .bind(alert.previous_premium)
    .bind(alert.message)
    .bind(alert.sent)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Time of the last successfully sent alert of `kind` (for `symbol`, or the aggregate when `None`).
pub async fn last_sent_at(
    pool: &PgPool,
    kind: AlertKind,
    symbol: Option<&str>,
) -> anyhow::Result<Option<DateTime<Utc>>> {
    let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
        r#"
        SELECT created_at FROM kimp_spike_alerts
        WHERE kind = $1 AND sent = true AND symbol IS NOT DISTINCT FROM $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(kind.as_str())
    .bind(symbol)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(at,)| at))
}

pub async fn recent_alerts(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<KimpAlert>> {
    let rows = sqlx::query_as::<_, KimpAlert>(
        "SELECT * FROM kimp_spike_alerts ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
