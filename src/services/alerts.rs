use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::analysis::{detect_spikes, is_suppressed, select_abs, select_two_sided, PremiumMetric};
use crate::db::alert_repo::{self, NewAlert};
use crate::db::history_repo;
use crate::exchanges::ForeignVenue;
use crate::models::{AlertKind, AlertOutcome, PremiumRecord};
use crate::services::notifier::{self, Notifier};
use crate::AppState;

/// Body of a manual alert request. Unset fields fall back to configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualAlertRequest {
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    #[serde(default)]
    pub metric: Option<PremiumMetric>,
    #[serde(default)]
    pub venue: Option<ForeignVenue>,
}

/// Send through the notifier if one is configured. Counts the outcome.
async fn dispatch(notifier: Option<&Notifier>, kind: AlertKind, message: &str) -> bool {
    let Some(n) = notifier else {
        tracing::debug!(kind = kind.as_str(), "Notifier not configured, alert not sent");
        return false;
    };

    let sent = n.send(message).await;
    if sent {
        counter!("alerts_sent_total", "kind" => kind.as_str()).increment(1);
    } else {
        counter!("alerts_failed_total", "kind" => kind.as_str()).increment(1);
    }
    sent
}

/// Persist an alert row; a failed insert is logged, never propagated.
async fn record_alert(state: &AppState, alert: NewAlert<'_>) {
    let kind = alert.kind;
    if let Err(e) = alert_repo::insert_alert(&state.db, alert).await {
        tracing::warn!(error = %e, kind = kind.as_str(), "Failed to persist alert record");
    }
}

/// Serialize runs of `kind` across processes, so a scheduler tick and an
/// external cron call cannot both pass the repeat-window check.
async fn lock_run(
    state: &AppState,
    kind: AlertKind,
) -> anyhow::Result<Option<sqlx::Transaction<'static, sqlx::Postgres>>> {
    let lock = alert_repo::try_lock_run(&state.db, kind).await?;
    if lock.is_none() {
        tracing::info!(kind = kind.as_str(), "Alert run already in progress, skipping");
        counter!("alerts_suppressed_total", "kind" => kind.as_str()).increment(1);
    }
    Ok(lock)
}

/// Run `body` under the lock for `kind`, releasing it when done.
async fn locked<F>(state: &AppState, kind: AlertKind, body: F) -> anyhow::Result<AlertOutcome>
where
    F: std::future::Future<Output = anyhow::Result<AlertOutcome>>,
{
    let Some(lock) = lock_run(state, kind).await? else {
        return Ok(skipped(kind));
    };
    let outcome = body.await;
    if let Err(e) = lock.rollback().await {
        tracing::warn!(error = %e, kind = kind.as_str(), "Failed to release alert run lock");
    }
    outcome
}

fn skipped(kind: AlertKind) -> AlertOutcome {
    AlertOutcome {
        kind,
        matched: 0,
        sent: false,
        suppressed: vec!["*".into()],
        fx_fallback: false,
        records: Vec::new(),
    }
}

/// Split records into those free to alert and the symbols still inside the repeat window.
async fn partition_suppressed(
    state: &AppState,
    kind: AlertKind,
    records: Vec<PremiumRecord>,
) -> anyhow::Result<(Vec<PremiumRecord>, Vec<String>)> {
    let now = Utc::now();
    let window = state.config.alert_window();
    let mut allowed = Vec::new();
    let mut suppressed = Vec::new();

    for r in records {
        let last = alert_repo::last_sent_at(&state.db, kind, Some(&r.symbol)).await?;
        if is_suppressed(last, now, window) {
            suppressed.push(r.symbol);
        } else {
            allowed.push(r);
        }
    }

    if !suppressed.is_empty() {
        counter!("alerts_suppressed_total", "kind" => kind.as_str()).increment(suppressed.len() as u64);
    }
    Ok((allowed, suppressed))
}

/// Manually triggered two-sided threshold alert. Never suppressed.
pub async fn run_manual_alert(state: &AppState, req: ManualAlertRequest) -> anyhow::Result<AlertOutcome> {
    let venue = req.venue.unwrap_or(state.config.foreign_venue);
    let metric = req.metric.unwrap_or_default();
    let high = req.high.unwrap_or(state.config.alert_high_pct);
    let low = req.low.unwrap_or(state.config.alert_low_pct);

    let snapshot = state.premium.snapshot(venue).await?;
    let matches = select_two_sided(&snapshot.records, metric, high, low);

    let mut sent = false;
    if !matches.is_empty() {
        let message = notifier::format_threshold_alert("김프 알림 (수동)", &matches, metric, high, low, &snapshot);
        sent = dispatch(state.notifier.as_deref(), AlertKind::Manual, &message).await;
        if state.notifier.is_some() {
            record_alert(
                state,
                NewAlert {
                    kind: AlertKind::Manual,
                    symbol: None,
                    premium: matches.first().map(|r| metric.value(r)),
                    previous_premium: None,
                    message: &message,
                    sent,
                },
            )
            .await;
        }
    }

    tracing::info!(matched = matches.len(), sent, "Manual alert run");

    Ok(AlertOutcome {
        kind: AlertKind::Manual,
        matched: matches.len(),
        sent,
        suppressed: Vec::new(),
        fx_fallback: snapshot.fx_fallback,
        records: matches,
    })
}

/// Scheduled two-sided threshold alert. Records an aggregate snapshot on every run;
/// a single aggregate repeat window applies.
pub async fn run_auto_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    locked(state, AlertKind::Auto, auto_alert(state)).await
}

async fn auto_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    let config = &state.config;
    let snapshot = state.premium.snapshot(config.foreign_venue).await?;

    if let Err(e) = history_repo::insert_snapshot(&state.db, &snapshot).await {
        tracing::warn!(error = %e, "Failed to record premium snapshot");
    }

    let metric = PremiumMetric::Premium;
    let matches = select_two_sided(&snapshot.records, metric, config.alert_high_pct, config.alert_low_pct);

    let mut outcome = AlertOutcome {
        kind: AlertKind::Auto,
        matched: matches.len(),
        sent: false,
        suppressed: Vec::new(),
        fx_fallback: snapshot.fx_fallback,
        records: Vec::new(),
    };
    if matches.is_empty() {
        return Ok(outcome);
    }

    let last = alert_repo::last_sent_at(&state.db, AlertKind::Auto, None).await?;
    if is_suppressed(last, Utc::now(), config.alert_window()) {
        tracing::info!(matched = matches.len(), "Auto alert suppressed by repeat window");
        counter!("alerts_suppressed_total", "kind" => AlertKind::Auto.as_str()).increment(1);
        outcome.suppressed.push("*".into());
        outcome.records = matches;
        return Ok(outcome);
    }

    let message = notifier::format_threshold_alert(
        "김프 알림",
        &matches,
        metric,
        config.alert_high_pct,
        config.alert_low_pct,
        &snapshot,
    );
    outcome.sent = dispatch(state.notifier.as_deref(), AlertKind::Auto, &message).await;
    if state.notifier.is_some() {
        record_alert(
            state,
            NewAlert {
                kind: AlertKind::Auto,
                symbol: None,
                premium: Some(metric.value(&matches[0])),
                previous_premium: None,
                message: &message,
                sent: outcome.sent,
            },
        )
        .await;
    }

    tracing::info!(matched = matches.len(), sent = outcome.sent, "Auto alert run");
    outcome.records = matches;
    Ok(outcome)
}

/// Alert on coins whose premium moved at least `spike_delta_pct` points since
/// the last recorded per-coin snapshot, then record the current one.
pub async fn run_spike_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    locked(state, AlertKind::Spike, spike_alert(state)).await
}

async fn spike_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    let config = &state.config;
    let venue = config.foreign_venue;
    let snapshot = state.premium.snapshot(venue).await?;

    let previous = history_repo::latest_coin_premiums(&state.db, venue.as_str()).await?;
    let spikes = detect_spikes(&snapshot.records, &previous, config.spike_delta_pct);

    if let Err(e) = history_repo::insert_coin_rows(&state.db, &snapshot).await {
        tracing::warn!(error = %e, "Failed to record per-coin premium history");
    }

    let matched = spikes.len();
    let spiked: Vec<PremiumRecord> = spikes.iter().map(|s| s.record.clone()).collect();
    let (allowed, suppressed) = partition_suppressed(state, AlertKind::Spike, spiked).await?;
    let to_send: Vec<_> = spikes
        .into_iter()
        .filter(|s| allowed.iter().any(|r| r.symbol == s.record.symbol))
        .collect();

    let mut sent = false;
    if !to_send.is_empty() {
        let message = notifier::format_spike_alert(&to_send, &snapshot);
        sent = dispatch(state.notifier.as_deref(), AlertKind::Spike, &message).await;
        if state.notifier.is_some() {
            for s in &to_send {
                record_alert(
                    state,
                    NewAlert {
                        kind: AlertKind::Spike,
                        symbol: Some(&s.record.symbol),
                        premium: Some(s.record.premium),
                        previous_premium: Some(s.previous_premium),
                        message: &message,
                        sent,
                    },
                )
                .await;
            }
        }
    }

    tracing::info!(
        matched,
        sent,
        suppressed = suppressed.len(),
        "Spike alert run"
    );

    Ok(AlertOutcome {
        kind: AlertKind::Spike,
        matched,
        sent,
        suppressed,
        fx_fallback: snapshot.fx_fallback,
        records: allowed,
    })
}

/// Report watch-list coins whose pure premium exceeds the watch threshold.
pub async fn run_watch_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    locked(state, AlertKind::Watch, watch_alert(state)).await
}

async fn watch_alert(state: &AppState) -> anyhow::Result<AlertOutcome> {
    let config = &state.config;
    let snapshot = state.premium.snapshot(config.foreign_venue).await?;

    let watched: Vec<PremiumRecord> = snapshot
        .records
        .iter()
        .filter(|r| config.watch_symbols.contains(&r.symbol))
        .cloned()
        .collect();
    let matches = select_abs(&watched, PremiumMetric::Pure, config.watch_threshold_pct);
    let matched = matches.len();

    let (allowed, suppressed) = partition_suppressed(state, AlertKind::Watch, matches).await?;

    let mut sent = false;
    if !allowed.is_empty() {
        let message = notifier::format_watch_alert(&allowed, config.watch_threshold_pct, &snapshot);
        sent = dispatch(state.notifier.as_deref(), AlertKind::Watch, &message).await;
        if state.notifier.is_some() {
            for r in &allowed {
                record_alert(
                    state,
                    NewAlert {
                        kind: AlertKind::Watch,
                        symbol: Some(&r.symbol),
                        premium: Some(r.pure_premium),
                        previous_premium: None,
                        message: &message,
                        sent,
                    },
                )
                .await;
            }
        }
    }

    tracing::info!(matched, sent, suppressed = suppressed.len(), "Watch alert run");

    Ok(AlertOutcome {
        kind: AlertKind::Watch,
        matched,
        sent,
        suppressed,
        fx_fallback: snapshot.fx_fallback,
        records: allowed,
    })
}
