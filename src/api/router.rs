use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_cron_secret;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes: dashboards and the manual alert button
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        // Premium data
        .route("/api/kimp", get(handlers::premium::snapshot))
        .route("/api/kimp/history", get(handlers::premium::history))
        .route("/api/kimp/history/:symbol", get(handlers::premium::coin_history))
        .route("/api/kimp/alerts", get(handlers::premium::recent_alerts))
        // Manual alert
        .route("/api/alert", post(handlers::alerts::manual))
        // Whales (read-only)
        .route("/api/whales", get(handlers::whales::list))
        .route("/api/whales/alerts", get(handlers::whales::alerts));

    // Cron-triggered and mutating routes; Bearer CRON_SECRET when set
    let protected = Router::new()
        .route("/api/alert/auto", get(handlers::alerts::auto))
        .route("/api/alert/spike", get(handlers::alerts::spike))
        .route("/api/alert/watch", get(handlers::alerts::watch))
        .route("/api/whales/check", get(handlers::whales::check))
        .route("/api/whales/wallets", post(handlers::whales::add))
        .route("/api/whales/wallets/:id", delete(handlers::whales::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_cron_secret));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
