//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, replica
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_replica_health` (gauge): 1=alive, 0=dead, per replica

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its scrape endpoint.
///
/// Failure to install is logged, not fatal: the proxy keeps serving and
/// metric updates become no-ops.
pub fn init(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one terminal request outcome.
pub fn record_request(method: &str, status: u16, replica: &str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "replica" => replica.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "replica" => replica.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a probe result for one replica.
pub fn record_replica_health(replica: &str, alive: bool) {
    metrics::gauge!("proxy_replica_health", "replica" => replica.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
