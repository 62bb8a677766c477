//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define interception metrics (handshakes, misses)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `interceptor_requests_total` (counter): completed handshakes by
//!   route, status, and outcome (synthetic/real/inactive/unresolved)
//! - `interceptor_unrouted_total` (counter): requests matching no route
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic increments)
//! - The exporter runs on its own listener, separate from the proxy

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(address: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(address).install() {
        Ok(()) => tracing::info!(address = %address, "Metrics exporter listening"),
        Err(error) => tracing::error!(
            address = %address,
            error = %error,
            "Failed to install metrics exporter"
        ),
    }
}

/// Count one completed handshake.
pub fn record_handshake(route: &str, status: StatusCode, outcome: &'static str) {
    metrics::counter!(
        "interceptor_requests_total",
        "route" => route.to_string(),
        "status" => status.as_u16().to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Count one request that matched no route.
pub fn record_unrouted() {
    metrics::counter!("interceptor_unrouted_total").increment(1);
}
