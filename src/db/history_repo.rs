use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{KimpCoinHistory, KimpHistory, PremiumSnapshot};

/// Insert the aggregate row for a snapshot.
pub async fn insert_snapshot(pool: &PgPool, snapshot: &PremiumSnapshot) -> anyhow::Result<KimpHistory> {
    let btc_premium = snapshot.record("BTC").map(|r| r.premium);

    let row = sqlx::query_as::<_, KimpHistory>(
        r#"
        INSERT INTO kimp_history
            (venue, fx_rate, fx_fallback, stable_premium, average_premium, btc_premium, coin_count, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(snapshot.venue.as_str())
    .bind(snapshot.fx_rate)
    .bind(snapshot.fx_fallback)
    .bind(snapshot.stable_premium)
    .bind(snapshot.average_premium)
    .bind(btc_premium)
    .bind(snapshot.records.len() as i32)
    .bind(snapshot.computed_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Batch insert one row per coin of the snapshot. Returns the number of rows written.
pub async fn insert_coin_rows(pool: &PgPool, snapshot: &PremiumSnapshot) -> anyhow::Result<u64> {
    if snapshot.records.is_empty() {
        return Ok(0);
    }

    let symbols: Vec<String> = snapshot.records.iter().map(|r| r.symbol.clone()).collect();
    let domestic: Vec<Decimal> = snapshot.records.iter().map(|r| r.domestic_krw).collect();
    let foreign: Vec<Decimal> = snapshot.records.iter().map(|r| r.foreign_usd).collect();
    let premium: Vec<Decimal> = snapshot.records.iter().map(|r| r.premium).collect();
    let net: Vec<Decimal> = snapshot.records.iter().map(|r| r.net_premium).collect();
    let pure: Vec<Decimal> = snapshot.records.iter().map(|r| r.pure_premium).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO kimp_coin_history
            (symbol, venue, domestic_krw, foreign_usd, premium, net_premium, pure_premium, recorded_at)
        SELECT s, $2, d, f, p, n, u, $8
        FROM UNNEST($1::text[], $3::numeric[], $4::numeric[], $5::numeric[], $6::numeric[], $7::numeric[])
            AS t(s, d, f, p, n, u)
        "#,
    )
    .bind(&symbols)
    .bind(snapshot.venue.as_str())
    .bind(&domestic)
    .bind(&foreign)
    .bind(&premium)
    .bind(&net)
    .bind(&pure)
    .bind(snapshot.computed_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Most recent recorded premium per symbol for a venue (last 24h only).
pub async fn latest_coin_premiums(pool: &PgPool, venue: &str) -> anyhow::Result<HashMap<String, Decimal>> {
    let cutoff = Utc::now() - Duration::hours(24);

    let rows: Vec<(String, Decimal)> = sqlx::query_as(
        r#"
        SELECT DISTINCT ON (symbol) symbol, premium
        FROM kimp_coin_history
        WHERE venue = $1 AND recorded_at >= $2
        ORDER BY symbol, recorded_at DESC
        "#,
    )
    .bind(venue)
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Aggregate snapshots from the last `hours`, oldest first.
pub async fn list_history(pool: &PgPool, hours: i64) -> anyhow::Result<Vec<KimpHistory>> {
    let cutoff = Utc::now() - Duration::hours(hours);

    let rows = sqlx::query_as::<_, KimpHistory>(
        "SELECT * FROM kimp_history WHERE recorded_at >= $1 ORDER BY recorded_at ASC",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Per-coin history for one symbol from the last `hours`, oldest first.
pub async fn coin_history(pool: &PgPool, symbol: &str, hours: i64) -> anyhow::Result<Vec<KimpCoinHistory>> {
    let cutoff = Utc::now() - Duration::hours(hours);

    let rows = sqlx::query_as::<_, KimpCoinHistory>(
        r#"
        SELECT * FROM kimp_coin_history
        WHERE symbol = $1 AND recorded_at >= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(symbol)
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
