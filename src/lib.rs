pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod exchanges;
pub mod explorer;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::notifier::Notifier;
use crate::services::premium_service::PremiumService;
use crate::services::whale_monitor::WhaleMonitor;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub notifier: Option<Arc<Notifier>>,
    pub premium: PremiumService,
    /// `None` when no explorer API key is configured.
    pub whale_monitor: Option<WhaleMonitor>,
}
