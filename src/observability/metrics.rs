//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trigger_requests_total` (counter): dispatched requests by method, route, status
//! - `trigger_request_duration_seconds` (histogram): dispatch latency
//! - `trigger_outbound_calls_total` (counter): connector calls by connector, outcome
//! - `trigger_outbound_duration_seconds` (histogram): connector latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("trigger_requests_total", &labels[..]).increment(1);
    metrics::histogram!("trigger_request_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
}

/// Record one outbound connector call.
pub fn record_outbound(connector: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "trigger_outbound_calls_total",
        "connector" => connector,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("trigger_outbound_duration_seconds", "connector" => connector)
        .record(start.elapsed().as_secs_f64());
}
