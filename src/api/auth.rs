use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Bearer-token check for cron-triggered routes.
///
/// If `CRON_SECRET` is configured, every request must carry
/// `Authorization: Bearer <secret>` matching that value.
/// If it is unset, the check is disabled (dev mode).
pub async fn require_cron_secret(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.config.cron_secret.as_deref() else {
        return next.run(req).await;
    };

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    match auth_header.and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) if token == expected => next.run(req).await,
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "Rejected cron request with wrong token");
            AppError::Unauthorized.into_response()
        }
        None => AppError::Unauthorized.into_response(),
    }
}
