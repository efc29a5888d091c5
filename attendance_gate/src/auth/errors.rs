//! Authentication error types.
//!
//! Only fatal conditions are errors. A bad password, an expired token or an
//! unknown fingerprint are ordinary outcomes of the gate, not errors.

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No secret to derive the encryption key from
    #[error("Encryption key is not configured (set ENCRYPTION_KEY)")]
    MissingEncryptionKey,

    /// First run and no default password to fall back to
    #[error("No password has been set yet and DEFAULT_PASSWORD is not configured")]
    MissingDefaultPassword,

    /// Row store error
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Encryption failed
    #[error("Encryption failed")]
    EncryptionFailed,

    /// Ciphertext was malformed, tampered with, or sealed under another key
    #[error("Decryption failed")]
    DecryptionFailed,
}

impl AuthError {
    /// Get an operator-facing message that does not leak internal details
    ///
    /// Store errors are reduced to a connectivity hint; the underlying cause
    /// is logged, not shown.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::MissingEncryptionKey => {
                "The encryption key is not configured. Set ENCRYPTION_KEY in the server environment."
                    .to_string()
            }
            AuthError::MissingDefaultPassword => {
                "This is the first run. Set DEFAULT_PASSWORD in the server environment.".to_string()
            }
            AuthError::Store(_) => {
                "Cannot reach the record store. Check the store location and permissions, then try again."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Configuration errors are the operator's to fix; everything else is
    /// the environment's
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AuthError::MissingEncryptionKey | AuthError::MissingDefaultPassword
        )
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
