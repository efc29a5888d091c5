//! # Attendance Gate
//!
//! Shared-password gate for a small church attendance app.
//!
//! The app has no user accounts. Members get in with one shared password,
//! and a successful login hands back a sealed session token in the URL and
//! remembers the browser by fingerprint, so bookmarking the link (or simply
//! coming back from the same phone) skips the prompt for a while.
//!
//! ## Core Modules
//!
//! - [`auth`]: The per-request gate, token sealing and fingerprinting
//! - [`store`]: Spreadsheet-like row storage for the password and records
//!
//! ## Example
//!
//! ```
//! use attendance_gate::auth::{RequestContext, fingerprint};
//!
//! let request = RequestContext::new().with_header("User-Agent", "Mozilla/5.0");
//! assert!(fingerprint::derive(&request).is_some());
//! ```

/// Per-request authentication gate.
pub mod auth;
pub use auth::{AuthConfig, AuthError, AuthResult, Authenticator, GateOutcome, SessionContext};

/// Row-oriented persistence backends.
pub mod store;
pub use store::{FileRowStore, MemoryRowStore, RecordRepository, SheetRecordRepository, StoreConfig};
