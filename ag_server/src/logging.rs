//! Structured logging configuration.
//!
//! This module provides structured logging with request correlation and
//! security event tracking. Records emitted by the `attendance_gate` library
//! through the `log` facade are forwarded into the same subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Features:
/// - Request ID correlation
/// - Security event tracking
/// - Configurable log levels via RUST_LOG env var
/// - `log` records from the library bridged into `tracing`
///
/// # Example
///
/// ```no_run
/// use ag_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `request_id` - Optional request correlation ID
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use ag_server::logging::log_security_event;
///
/// log_security_event("failed_login", Some("6f1c..."), "Wrong entry password");
/// ```
pub fn log_security_event(event_type: &str, request_id: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        request_id = request_id,
        "SECURITY: {}",
        message
    );
}

/// Log the gate decision for one request
///
/// # Arguments
///
/// * `state` - Final gate state (`AUTHENTICATED`, `AWAITING_PASSWORD`, `BLOCKED`)
/// * `method` - Mechanism that admitted the request, if any
/// * `request_id` - Optional request correlation ID
pub fn log_gate_decision(state: &str, method: Option<&str>, request_id: Option<&str>) {
    tracing::debug!(
        gate_state = state,
        auth_method = method,
        request_id = request_id,
        "Gate decision"
    );
}

/// Log performance metric
///
/// # Arguments
///
/// * `operation` - Operation name
/// * `duration_ms` - Duration in milliseconds
/// * `metadata` - Additional metadata
///
/// # Example
///
/// ```
/// use ag_server::logging::log_performance;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// // ... do work ...
/// let duration = start.elapsed().as_millis() as u64;
/// log_performance("purge_expired", duration, Some("sessions"));
/// ```
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some("req-1"), "Test message");
        log_security_event("test_event", None, "Test message");
    }

    #[test]
    fn test_log_gate_decision() {
        log_gate_decision("AUTHENTICATED", Some("token"), Some("req-1"));
        log_gate_decision("BLOCKED", None, None);
    }

    #[test]
    fn test_log_performance() {
        log_performance("test_operation", 500, Some("metadata"));
        log_performance("slow_operation", 2000, None);
    }
}
