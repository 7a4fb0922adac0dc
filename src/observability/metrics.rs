//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_group_dial_failures_total` (counter): dial failures by group, adapter kind
//! - `proxy_group_health_checks_total` (counter): sweeps by group, outcome
//! - `proxy_group_resolved_backends` (gauge): size of the last resolved set
//! - `proxy_group_probe_latency_seconds` (histogram): probe latency by group, backend
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; it is a no-op until an
//!   exporter is installed

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::backend::AdapterKind;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_dial_failure(group: &str, kind: AdapterKind) {
    metrics::counter!(
        "proxy_group_dial_failures_total",
        "group" => group.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

pub fn record_sweep(group: &str, outcome: &'static str) {
    metrics::counter!(
        "proxy_group_health_checks_total",
        "group" => group.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Handle for a group's resolved-set size, registered once per group.
/// Only bound to an exporter installed before it is created.
pub fn resolved_gauge(group: &str) -> metrics::Gauge {
    metrics::gauge!("proxy_group_resolved_backends", "group" => group.to_string())
}

pub fn record_probe(group: &str, backend: &str, latency: Duration) {
    metrics::histogram!(
        "proxy_group_probe_latency_seconds",
        "group" => group.to_string(),
        "backend" => backend.to_string()
    )
    .record(latency.as_secs_f64());
}
