//! Authentication module gating the attendance app behind one shared password.
//!
//! Every request passes through the gate, which tries in order:
//! - the in-request [`SessionContext`] flag
//! - a sealed session token carried in the `session` query parameter
//! - a browser fingerprint derived from request headers
//! - the shared entry password, prompting for it when nothing else matched
//!
//! A successful password login issues a fresh token and records the browser
//! fingerprint, so the next visit from the same link or browser skips the
//! prompt. The first login uses the configured default password and forces a
//! password change before anything else is shown.
//!
//! ## Example
//!
//! ```no_run
//! use attendance_gate::auth::{AuthConfig, Authenticator, RequestContext, SessionContext};
//! use attendance_gate::store::{MemoryRowStore, SheetRecordRepository};
//! use std::{sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryRowStore::new());
//!     let repository = SheetRecordRepository::new(store, Duration::from_secs(5));
//!     let auth = Authenticator::new(Arc::new(repository), AuthConfig::from_env());
//!
//!     let mut ctx = SessionContext::new();
//!     let request = RequestContext::new().with_header("user-agent", "Mozilla/5.0");
//!     let outcome = auth.check(&mut ctx, &request, Some("welcome1")).await?;
//!     println!("authenticated: {}", outcome.is_authenticated());
//!     Ok(())
//! }
//! ```

pub mod cipher;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod manager;
pub mod models;

pub use cipher::SecretCipher;
pub use config::{AuthConfig, DEFAULT_SESSION_DAYS};
pub use errors::{AuthError, AuthResult};
pub use manager::Authenticator;
pub use models::{
    AuthMethod, CredentialRecord, GateOutcome, GateState, PasswordChange, RecordCheck,
    RecordKind, RequestContext, SessionContext, TokenClaims,
};
