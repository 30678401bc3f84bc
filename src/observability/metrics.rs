//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_identity_lookups_total` (counter): identity lookups by outcome
//! - `gateway_masked_errors_total` (counter): backend 500s replaced by an error id
//!
//! Recording is a no-op until a recorder is installed, so handlers and
//! tests never need to know whether the exporter is running.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    let status = status.to_string();
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.clone(),
        "service" => service.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status,
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of an identity lookup (`resolved`, `unknown`, `failed`).
pub fn record_identity_lookup(outcome: &'static str) {
    counter!("gateway_identity_lookups_total", "outcome" => outcome).increment(1);
}

/// Record a backend 500 that was masked.
pub fn record_masked_error(service: &str) {
    counter!("gateway_masked_errors_total", "service" => service.to_string()).increment(1);
}
