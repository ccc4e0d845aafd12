use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{clamp_param, ApiResponse};
use crate::db::whale_repo;
use crate::errors::AppError;
use crate::models::{WhaleAlert, WhaleCheckReport, WhaleWallet};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddWalletRequest {
    pub address: String,
    pub label: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<WhaleWallet>>>, AppError> {
    let wallets = whale_repo::get_active_wallets(&state.db).await?;
    Ok(ApiResponse::ok(wallets))
}

pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<AddWalletRequest>,
) -> Result<Json<ApiResponse<WhaleWallet>>, AppError> {
    let address = req.address.trim();
    if !is_valid_address(address) {
        return Err(AppError::BadRequest(format!("invalid wallet address '{address}'")));
    }

    let wallet = whale_repo::upsert_wallet(&state.db, address, req.label.as_deref(), req.notes.as_deref()).await?;
    tracing::info!(address = %wallet.address, label = ?wallet.label, "Whale wallet tracked");
    Ok(ApiResponse::ok(wallet))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    if !whale_repo::deactivate_wallet(&state.db, id).await? {
        return Err(AppError::NotFound(format!("wallet {id} not found")));
    }
    tracing::info!(%id, "Whale wallet deactivated");
    Ok(ApiResponse::ok(id))
}

/// Recent whale transfers, newest first.
pub async fn alerts(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<WhaleAlert>>>, AppError> {
    let limit = clamp_param(q.limit, 50, 1, 500);
    let rows = whale_repo::recent_alerts(&state.db, limit).await?;
    Ok(ApiResponse::ok(rows))
}

/// Run one whale check pass now.
pub async fn check(State(state): State<AppState>) -> Result<Json<ApiResponse<WhaleCheckReport>>, AppError> {
    let Some(monitor) = &state.whale_monitor else {
        return Err(AppError::BadRequest("whale monitoring is not configured (ETHERSCAN_API_KEY)".into()));
    };

    let report = monitor.check_all().await.map_err(AppError::from_service)?;
    Ok(ApiResponse::ok(report))
}
