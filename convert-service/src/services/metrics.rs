//! Prometheus export for the `/metrics` endpoint.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Later calls are no-ops.
///
/// Panics if another recorder was already installed by something else.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_conversion(converter: &str, outcome: &'static str, elapsed: Duration) {
    let labels = [("converter", converter.to_string()), ("outcome", outcome.to_string())];
    counter!("conversions_total", &labels).increment(1);
    histogram!("conversion_duration_seconds", &labels).record(elapsed.as_secs_f64());
}
