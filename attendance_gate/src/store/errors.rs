//! Row store error types.

use std::time::Duration;
use thiserror::Error;

/// Row store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("Row store unavailable: {0}")]
    Unavailable(String),

    /// Operation did not finish in time
    #[error("Row store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Worksheet file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Worksheet file is not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed A1 cell reference
    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    /// Invalid worksheet name
    #[error("Invalid worksheet name: {0}")]
    InvalidSheet(String),
}

impl StoreError {
    /// Whether the error means the backend itself is unreachable
    /// (as opposed to a malformed request).
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Timeout(_) | StoreError::Io(_)
        )
    }
}

/// Result type for row store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_unreachable_classification() {
        assert!(StoreError::Unavailable("down".into()).is_unreachable());
        assert!(StoreError::Timeout(Duration::from_secs(1)).is_unreachable());
        assert!(!StoreError::InvalidCell("ZZ".into()).is_unreachable());
    }
}
