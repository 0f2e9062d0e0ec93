//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trailhead_requests_total` (counter): requests by method, status, outcome
//! - `trailhead_request_duration_seconds` (histogram): dispatch latency by method, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Outcome labels are a small fixed set, keeping cardinality bounded

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "trailhead_requests_total";
pub const REQUEST_DURATION: &str = "trailhead_request_duration_seconds";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one dispatched request.
pub fn record_dispatch(method: &Method, status: u16, outcome: &'static str, elapsed: Duration) {
    let method = method.to_string();
    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
