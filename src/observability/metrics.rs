//! Metrics collection and exposition.
//!
//! # Metrics
//! - `boot_requests_total` (counter): dispatched requests by method, status, route
//! - `boot_request_duration_seconds` (histogram): dispatch latency
//! - `boot_client_rejected_total` (counter): access policy rejections by route
//! - `boot_route_cache_total` (counter): route table builds by cache outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is optional and serves its own listener

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_dispatch(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    ::metrics::counter!("boot_requests_total", &labels).increment(1);
    ::metrics::histogram!("boot_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_client_rejected(route: &str) {
    ::metrics::counter!("boot_client_rejected_total", "route" => route.to_string()).increment(1);
}

/// Outcome is one of `disabled`, `hit`, `miss`, `stale`, `unreadable`.
pub fn record_route_cache(outcome: &'static str) {
    ::metrics::counter!("boot_route_cache_total", "outcome" => outcome).increment(1);
}
