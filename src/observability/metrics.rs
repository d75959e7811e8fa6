//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (lookups by outcome, preparation failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_lookups_total` (counter): lookups by method and status
//! - `router_lookup_duration_seconds` (histogram): lookup latency
//! - `router_prepare_failures_total` (counter): endpoints rejected at preparation
//! - `router_endpoints` (gauge): endpoints currently served
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Labels are method and status only; paths would explode cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::router::Status;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one lookup.
pub fn record_lookup(method: &str, status: Status, start: Instant) {
    metrics::counter!(
        "router_lookups_total",
        "method" => method.to_string(),
        "status" => status.as_str()
    )
    .increment(1);

    metrics::histogram!("router_lookup_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record an endpoint whose chain sets failed to prepare.
pub fn record_prepare_failure(prefix: &str) {
    metrics::counter!("router_prepare_failures_total", "prefix" => prefix.to_string())
        .increment(1);
}

/// Record the number of endpoints currently served.
pub fn record_endpoints(count: usize) {
    metrics::gauge!("router_endpoints").set(count as f64);
}
