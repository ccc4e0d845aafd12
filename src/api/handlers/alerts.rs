use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::AlertOutcome;
use crate::services::alerts::{self, ManualAlertRequest};
use crate::AppState;

type AlertResponse = Result<Json<ApiResponse<AlertOutcome>>, AppError>;

/// `POST /api/alert`. An empty body uses the configured thresholds.
pub async fn manual(State(state): State<AppState>, body: Option<Json<ManualAlertRequest>>) -> AlertResponse {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let outcome = alerts::run_manual_alert(&state, req)
        .await
        .map_err(AppError::from_service)?;
    Ok(ApiResponse::ok(outcome))
}

pub async fn auto(State(state): State<AppState>) -> AlertResponse {
    let outcome = alerts::run_auto_alert(&state)
        .await
        .map_err(AppError::from_service)?;
    Ok(ApiResponse::ok(outcome))
}

pub async fn spike(State(state): State<AppState>) -> AlertResponse {
    let outcome = alerts::run_spike_alert(&state)
        .await
        .map_err(AppError::from_service)?;
    Ok(ApiResponse::ok(outcome))
}

pub async fn watch(State(state): State<AppState>) -> AlertResponse {
    let outcome = alerts::run_watch_alert(&state)
        .await
        .map_err(AppError::from_service)?;
    Ok(ApiResponse::ok(outcome))
}
