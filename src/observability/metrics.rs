//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define mock server metrics (requests, latency, store size, flushes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `mockapi_requests_total` (counter): mock requests by method, outcome, status
//! - `mockapi_request_duration_seconds` (histogram): dispatch latency
//! - `mockapi_endpoints` (gauge): configured endpoint count
//! - `mockapi_store_flushes_total` (counter): store writes by result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay low-cardinality (no paths or ids)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched mock request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "mockapi_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("mockapi_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_endpoint_count(count: usize) {
    gauge!("mockapi_endpoints").set(count as f64);
}

/// Record a store flush; `result` is `ok` or `error`.
pub fn record_flush(result: &'static str) {
    counter!("mockapi_store_flushes_total", "result" => result).increment(1);
}
