//! Authenticator configuration.

use std::{env, fmt};

/// Default lifetime of session and fingerprint records, in days
pub const DEFAULT_SESSION_DAYS: i64 = 30;

/// Secrets and knobs of the authenticator
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret the encryption key is derived from. Missing blocks every request.
    pub encryption_key: Option<String>,

    /// Password accepted while none is stored yet
    pub default_password: Option<String>,

    /// Lifetime of newly issued session and fingerprint records
    pub session_days: i64,
}

impl AuthConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `ENCRYPTION_KEY`: Secret for key derivation
    /// - `DEFAULT_PASSWORD`: First-run password
    /// - `SESSION_DAYS`: Record lifetime in days (default: 30)
    ///
    /// Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            encryption_key: non_blank_var("ENCRYPTION_KEY"),
            default_password: non_blank_var("DEFAULT_PASSWORD"),
            session_days: env::var("SESSION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|days: &i64| *days > 0)
                .unwrap_or(DEFAULT_SESSION_DAYS),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encryption_key: None,
            default_password: None,
            session_days: DEFAULT_SESSION_DAYS,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .field(
                "default_password",
                &self.default_password.as_ref().map(|_| "<redacted>"),
            )
            .field("session_days", &self.session_days)
            .finish()
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
