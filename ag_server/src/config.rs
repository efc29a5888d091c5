//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use attendance_gate::{AuthConfig, StoreConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Row store configuration
    pub store: StoreConfig,
    /// Authenticator secrets and session lifetime
    pub auth: AuthConfig,
    /// Seconds between expired-record purges; 0 disables the job
    pub purge_interval_secs: u64,
    /// Prometheus exporter address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `store_dir_override` - Optional store directory override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but does not parse.
    /// A missing `ENCRYPTION_KEY` is not an error here: the server starts and
    /// every request is blocked with an explanation instead.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        store_dir_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr_var("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let mut store = StoreConfig::from_env();
        if let Some(dir) = store_dir_override {
            store.data_dir = dir;
        }

        Ok(ServerConfig {
            bind,
            store,
            auth: AuthConfig::from_env(),
            purge_interval_secs: parse_env_or("SESSION_PURGE_INTERVAL_SECS", 0),
            metrics_bind: parse_addr_var("METRICS_BIND")?,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.operation_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "STORE_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.store.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                var: "STORE_DIR".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Problems that do not stop startup but block every request
    pub fn warnings(&self) -> Vec<ConfigError> {
        let mut warnings = Vec::new();
        if self.auth.encryption_key.is_none() {
            warnings.push(ConfigError::MissingRequired {
                var: "ENCRYPTION_KEY".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            });
        }
        if self.auth.default_password.is_none() {
            warnings.push(ConfigError::MissingRequired {
                var: "DEFAULT_PASSWORD".to_string(),
                hint: "Needed for the first login, before a password is stored".to_string(),
            });
        }
        warnings
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Default {DEFAULT_BIND} does not parse"),
    })
}

/// Parse an optional socket address variable; set but unparseable is an error
fn parse_addr_var(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("'{value}' is not an IP:PORT address"),
                })
        }
        _ => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: serialized with every other env-mutating test
        unsafe {
            for key in [
                "SERVER_BIND",
                "METRICS_BIND",
                "SESSION_PURGE_INTERVAL_SECS",
                "STORE_DIR",
                "STORE_TIMEOUT_SECS",
                "ENCRYPTION_KEY",
                "DEFAULT_PASSWORD",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    fn sample_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8501".parse().unwrap(),
            store: StoreConfig::development(),
            auth: AuthConfig {
                encryption_key: Some("k".to_string()),
                default_password: Some("welcome1".to_string()),
                session_days: 30,
            },
            purge_interval_secs: 0,
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "ENCRYPTION_KEY".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ENCRYPTION_KEY"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = ServerConfig::from_env(None, None).unwrap();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.purge_interval_secs, 0);
        assert!(config.metrics_bind.is_none());
        assert_eq!(config.warnings().len(), 2);
    }

    #[test]
    #[serial]
    fn test_overrides_win_over_env() {
        clear_env();
        unsafe {
            std::env::set_var("SERVER_BIND", "0.0.0.0:9000");
            std::env::set_var("STORE_DIR", "/var/lib/gate");
        }
        let config =
            ServerConfig::from_env(Some("127.0.0.1:7000".parse().unwrap()), Some("/tmp/x".into()))
                .unwrap();
        assert_eq!(config.bind.port(), 7000);
        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/x"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_metrics_bind_is_invalid() {
        clear_env();
        unsafe {
            std::env::set_var("METRICS_BIND", "not-an-address");
        }
        let err = ServerConfig::from_env(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
        clear_env();
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = sample_config();
        config.store.operation_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation_metrics_on_server_port() {
        let mut config = sample_config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());

        config.metrics_bind = Some("127.0.0.1:9090".parse().unwrap());
        assert!(config.validate().is_ok());
    }
}
