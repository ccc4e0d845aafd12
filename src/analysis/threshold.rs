use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PremiumRecord, PremiumSpike};

/// Which premium figure an alert compares against its thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumMetric {
    #[default]
    Premium,
    Net,
    Pure,
}

impl PremiumMetric {
    pub fn value(&self, record: &PremiumRecord) -> Decimal {
        match self {
            PremiumMetric::Premium => record.premium,
            PremiumMetric::Net => record.net_premium,
            PremiumMetric::Pure => record.pure_premium,
        }
    }
}

/// Records with `value >= high` or `value <= low`, largest magnitude first.
pub fn select_two_sided(
    records: &[PremiumRecord],
    metric: PremiumMetric,
    high: Decimal,
    low: Decimal,
) -> Vec<PremiumRecord> {
    let mut hits: Vec<PremiumRecord> = records
        .iter()
        .filter(|r| {
            let v = metric.value(r);
            v >= high || v <= low
        })
        .cloned()
        .collect();
    sort_by_magnitude(&mut hits, metric);
    hits
}

/// Records with `|value| >= threshold`, largest magnitude first.
pub fn select_abs(
    records: &[PremiumRecord],
    metric: PremiumMetric,
    threshold: Decimal,
) -> Vec<PremiumRecord> {
    let mut hits: Vec<PremiumRecord> = records
        .iter()
        .filter(|r| metric.value(r).abs() >= threshold)
        .cloned()
        .collect();
    sort_by_magnitude(&mut hits, metric);
    hits
}

fn sort_by_magnitude(records: &mut [PremiumRecord], metric: PremiumMetric) {
    records.sort_by(|a, b| {
        metric
            .value(b)
            .abs()
            .cmp(&metric.value(a).abs())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

/// Coins whose premium moved by at least `min_delta` points since `previous`.
/// Coins without a previous value are skipped.
pub fn detect_spikes(
    records: &[PremiumRecord],
    previous: &HashMap<String, Decimal>,
    min_delta: Decimal,
) -> Vec<PremiumSpike> {
    let mut spikes: Vec<PremiumSpike> = records
        .iter()
        .filter_map(|r| {
            let prev = *previous.get(&r.symbol)?;
            let delta = r.premium - prev;
            (delta.abs() >= min_delta).then(|| PremiumSpike {
                record: r.clone(),
                previous_premium: prev,
                delta,
            })
        })
        .collect();
    spikes.sort_by(|a, b| {
        b.delta
            .abs()
            .cmp(&a.delta.abs())
            .then_with(|| a.record.symbol.cmp(&b.record.symbol))
    });
    spikes
}

/// True when a previous alert falls inside the repeat window.
pub fn is_suppressed(last_alert_at: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    match last_alert_at {
        Some(at) => now - at < window,
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(symbol: &str, premium: i64, pure: i64) -> PremiumRecord {
        PremiumRecord {
            symbol: symbol.into(),
            korean_name: None,
            domestic_krw: Decimal::ONE,
            domestic_usd: Decimal::ONE,
            foreign_usd: Decimal::ONE,
            premium: Decimal::new(premium, 1),
            net_premium: Decimal::new(premium, 1) - Decimal::new(15, 2),
            pure_premium: Decimal::new(pure, 1),
            volume_krw_24h: None,
        }
    }

    fn sample() -> Vec<PremiumRecord> {
        vec![
            rec("BTC", 32, 12),
            rec("ETH", 61, 41),
            rec("XRP", -25, -45),
            rec("SOL", 50, 30),
            rec("DOGE", -10, -30),
        ]
    }

    #[test]
    fn test_two_sided_only_returns_matches() {
        let high = Decimal::from(5);
        let low = Decimal::from(-1);
        let hits = select_two_sided(&sample(), PremiumMetric::Premium, high, low);

        assert!(hits.iter().all(|r| r.premium >= high || r.premium <= low));
        let symbols: Vec<&str> = hits.iter().map(|r| r.symbol.as_str()).collect();
        // sorted by magnitude: 6.1, 5.0, -2.5, -1.0
        assert_eq!(symbols, vec!["ETH", "SOL", "XRP", "DOGE"]);
    }

    #[test]
    fn test_abs_threshold_on_pure_metric() {
        let t = Decimal::from(3);
        let hits = select_abs(&sample(), PremiumMetric::Pure, t);

        assert!(hits.iter().all(|r| r.pure_premium.abs() >= t));
        let symbols: Vec<&str> = hits.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["XRP", "ETH", "DOGE", "SOL"]);
    }

    #[test]
    fn test_abs_threshold_no_match() {
        assert!(select_abs(&sample(), PremiumMetric::Premium, Decimal::from(50)).is_empty());
    }

    #[test]
    fn test_metric_value() {
        let r = rec("BTC", 32, 12);
        assert_eq!(PremiumMetric::Premium.value(&r), Decimal::new(32, 1));
        assert_eq!(PremiumMetric::Net.value(&r), Decimal::new(305, 2));
        assert_eq!(PremiumMetric::Pure.value(&r), Decimal::new(12, 1));
    }

    #[test]
    fn test_detect_spikes() {
        let mut previous = HashMap::new();
        previous.insert("BTC".to_string(), Decimal::new(30, 1)); // 3.0 -> 3.2
        previous.insert("ETH".to_string(), Decimal::new(20, 1)); // 2.0 -> 6.1
        previous.insert("XRP".to_string(), Decimal::new(5, 1)); // 0.5 -> -2.5

        let spikes = detect_spikes(&sample(), &previous, Decimal::from(2));
        let symbols: Vec<&str> = spikes.iter().map(|s| s.record.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ETH", "XRP"]);
        assert_eq!(spikes[0].delta, Decimal::new(41, 1));
        assert_eq!(spikes[1].delta, Decimal::from(-3));
    }

    #[test]
    fn test_suppressed_within_window() {
        let now = Utc::now();
        let window = Duration::hours(2);
        assert!(is_suppressed(Some(now - Duration::minutes(30)), now, window));
        assert!(is_suppressed(Some(now - Duration::minutes(119)), now, window));
    }

    #[test]
    fn test_permitted_outside_window() {
        let now = Utc::now();
        let window = Duration::hours(2);
        assert!(!is_suppressed(Some(now - Duration::hours(2)), now, window));
        assert!(!is_suppressed(Some(now - Duration::hours(5)), now, window));
        assert!(!is_suppressed(None, now, window));
    }
}
