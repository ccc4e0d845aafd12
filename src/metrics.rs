use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("premium_snapshots_total").absolute(0);
    counter!("whale_alerts_total").absolute(0);
    counter!("fx_fallback_total").absolute(0);
    for kind in ["manual", "auto", "spike", "watch"] {
        counter!("alerts_sent_total", "kind" => kind).absolute(0);
        counter!("alerts_suppressed_total", "kind" => kind).absolute(0);
        counter!("alerts_failed_total", "kind" => kind).absolute(0);
    }

    gauge!("kimchi_premium_avg").set(0.0);
    gauge!("fx_rate_krw").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("premium_pipeline_seconds").record(0.0);

    Ok(handle)
}

/// A handle for tests and tools that must not install the global recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
