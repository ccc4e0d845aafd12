use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::services::alerts;
use crate::services::whale_monitor::WhaleMonitor;
use crate::AppState;

/// Run the auto, spike and watch alert flows every `interval_secs`.
/// Stands in for an external cron hitting the trigger routes.
pub async fn run_premium_scheduler(state: AppState, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(interval_secs, "Premium alert scheduler started");

    loop {
        ticker.tick().await;

        if let Err(e) = alerts::run_auto_alert(&state).await {
            tracing::error!(error = %e, "Scheduled auto alert failed");
        }
        if let Err(e) = alerts::run_spike_alert(&state).await {
            tracing::error!(error = %e, "Scheduled spike alert failed");
        }
        if let Err(e) = alerts::run_watch_alert(&state).await {
            tracing::error!(error = %e, "Scheduled watch alert failed");
        }
    }
}

/// Run a whale check pass every `interval_secs`.
pub async fn run_whale_scheduler(monitor: WhaleMonitor, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(interval_secs, "Whale check scheduler started");

    loop {
        ticker.tick().await;

        if let Err(e) = monitor.check_all().await {
            tracing::error!(error = %e, "Scheduled whale check failed");
        }
    }
}
