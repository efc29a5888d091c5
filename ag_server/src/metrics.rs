//! Prometheus metrics for the attendance gate.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is set. Without an installed exporter the recording calls
//! are no-ops.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration
//! - **Gate Metrics**: Login attempts, admitted and blocked requests
//! - **Store Metrics**: Purged records
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ag_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Gate Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment admitted requests, labelled by mechanism.
pub fn gate_authenticated_total(method: &str) {
    metrics::counter!("gate_authenticated_total",
        "method" => method.to_string()
    )
    .increment(1);
}

/// Increment blocked requests, labelled by cause (`config` or `store`).
pub fn gate_blocked_total(cause: &str) {
    metrics::counter!("gate_blocked_total",
        "cause" => cause.to_string()
    )
    .increment(1);
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Add to the purged records counter.
pub fn records_purged_total(count: usize) {
    metrics::counter!("records_purged_total").increment(count as u64);
}
