//! Row store operation timeout helpers
//!
//! A store behind a network link can hang instead of failing. Every call the
//! repository makes goes through [`with_timeout`] so a stuck backend surfaces
//! as [`StoreError::Timeout`] and is handled like any other unreachable store.

use super::errors::{StoreError, StoreResult};
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for a single store operation (5 seconds)
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for compaction, which rewrites a whole worksheet (30 seconds)
pub const COMPACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute a store operation with timeout
///
/// # Arguments
///
/// * `duration` - Timeout duration
/// * `future` - Async store operation to execute
///
/// # Returns
///
/// * `StoreResult<T>` - Result of the operation or a timeout error
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = StoreResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}
