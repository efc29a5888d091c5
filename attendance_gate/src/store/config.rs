//! Row store configuration module.
//!
//! Provides configuration structures for the worksheet backend.

use std::{env, path::PathBuf, time::Duration};

use super::timeouts::DEFAULT_OPERATION_TIMEOUT;

/// Row store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one JSON file per worksheet
    pub data_dir: PathBuf,

    /// Timeout applied to each store operation, in seconds
    pub operation_timeout_secs: u64,
}

impl StoreConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `STORE_DIR`: Worksheet directory (default: `./data`)
    /// - `STORE_TIMEOUT_SECS`: Per-operation timeout in seconds (default: 5)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::development();
        Self {
            data_dir: env::var("STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            operation_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.operation_timeout_secs),
        }
    }

    /// Default configuration for local development
    pub fn development() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT.as_secs(),
        }
    }

    /// Per-operation timeout as a `Duration`
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        // SAFETY: serialized with every other env-mutating test
        unsafe {
            env::remove_var("STORE_DIR");
            env::remove_var("STORE_TIMEOUT_SECS");
        }
        let config = StoreConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        // SAFETY: serialized with every other env-mutating test
        unsafe {
            env::set_var("STORE_DIR", "/tmp/gate-store");
            env::set_var("STORE_TIMEOUT_SECS", "12");
        }
        let config = StoreConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gate-store"));
        assert_eq!(config.operation_timeout_secs, 12);
        unsafe {
            env::remove_var("STORE_DIR");
            env::remove_var("STORE_TIMEOUT_SECS");
        }
    }
}
