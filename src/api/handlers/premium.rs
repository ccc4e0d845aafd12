use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{clamp_param, ApiResponse};
use crate::db::{alert_repo, history_repo};
use crate::errors::AppError;
use crate::exchanges::ForeignVenue;
use crate::models::{KimpAlert, KimpCoinHistory, KimpHistory, PremiumSnapshot};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub venue: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Live premium table for every matched coin.
pub async fn snapshot(
    State(state): State<AppState>,
    Query(q): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<PremiumSnapshot>>, AppError> {
    let venue = match q.venue.as_deref() {
        Some(raw) => raw.parse::<ForeignVenue>().map_err(AppError::BadRequest)?,
        None => state.config.foreign_venue,
    };

    let snapshot = state.premium.snapshot(venue).await?;
    Ok(ApiResponse::ok(snapshot))
}

/// Aggregate snapshots, oldest first. `hours` defaults to 24, capped at 30 days.
pub async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<KimpHistory>>>, AppError> {
    let hours = clamp_param(q.hours, 24, 1, 720);
    let rows = history_repo::list_history(&state.db, hours).await?;
    Ok(ApiResponse::ok(rows))
}

pub async fn coin_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<KimpCoinHistory>>>, AppError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    let hours = clamp_param(q.hours, 24, 1, 720);
    let rows = history_repo::coin_history(&state.db, &symbol, hours).await?;
    Ok(ApiResponse::ok(rows))
}

/// Most recent premium alert records, newest first.
pub async fn recent_alerts(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<KimpAlert>>>, AppError> {
    let limit = clamp_param(q.limit, 50, 1, 500);
    let rows = alert_repo::recent_alerts(&state.db, limit).await?;
    Ok(ApiResponse::ok(rows))
}
