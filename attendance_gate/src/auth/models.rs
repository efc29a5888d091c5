//! Authentication data models.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Kind of a persisted credential record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Backs a URL session token
    Session,
    /// Backs a browser fingerprint
    Fingerprint,
}

impl RecordKind {
    /// Code stored in the `typ` column
    pub fn code(self) -> &'static str {
        match self {
            RecordKind::Session => "s",
            RecordKind::Fingerprint => "f",
        }
    }

    /// Parse a `typ` column value. Blank means session: rows written before
    /// fingerprints existed had no type column.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "" | "s" => Some(RecordKind::Session),
            "f" => Some(RecordKind::Fingerprint),
            _ => None,
        }
    }
}

/// Session or fingerprint record as stored in the sessions sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// SHA-256 hex of the session id, or the fingerprint hash
    pub hash: String,
    /// Unix timestamp (seconds) after which the record is dead
    pub expires_at: i64,
    pub kind: RecordKind,
}

impl CredentialRecord {
    /// Valid only while `now < expires_at` and for the matching kind
    pub fn is_valid_at(&self, kind: RecordKind, now: i64) -> bool {
        self.kind == kind && now < self.expires_at
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.hash.clone(),
            self.expires_at.to_string(),
            self.kind.code().to_string(),
        ]
    }

    /// Parse a sheet row; `None` for rows that are too short or malformed
    pub fn from_row(row: &[String]) -> Option<Self> {
        let hash = row.first()?.trim();
        if hash.is_empty() {
            return None;
        }
        let expires_at = row.get(1)?.trim().parse().ok()?;
        let kind = RecordKind::from_code(row.get(2).map(String::as_str).unwrap_or(""))?;
        Some(Self {
            hash: hash.to_string(),
            expires_at,
            kind,
        })
    }
}

/// Payload sealed inside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Random session id (never stored in plaintext)
    pub id: String,
    /// Expiration timestamp
    pub exp: i64,
}

/// What the host knows about the incoming request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Value of the `session` query parameter
    pub session_token: Option<String>,
    /// Request headers, names lowercased
    headers: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Session token, if present and not blank
    pub fn token(&self) -> Option<&str> {
        self.session_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Per-request authentication state.
///
/// Created at request start and discarded at request end. On the next request
/// it is re-derived from the token or fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub authenticated: bool,
    /// Logged in with the first-run default password; nothing else may be
    /// shown until the password is changed
    pub must_change_password: bool,
    /// A fresh token was just issued; the host may suggest bookmarking the URL
    pub show_bookmark_hint: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of one record lookup on a bypass path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCheck {
    Matched,
    NotFound,
    StoreUnavailable,
}

/// States of the per-request gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    CheckingToken,
    CheckingFingerprint,
    CheckingPassword,
    Authenticated,
    AwaitingPassword,
    Blocked,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::Unchecked => "UNCHECKED",
            GateState::CheckingToken => "CHECKING_TOKEN",
            GateState::CheckingFingerprint => "CHECKING_FINGERPRINT",
            GateState::CheckingPassword => "CHECKING_PASSWORD",
            GateState::Authenticated => "AUTHENTICATED",
            GateState::AwaitingPassword => "AWAITING_PASSWORD",
            GateState::Blocked => "BLOCKED",
        };
        f.write_str(name)
    }
}

/// Which mechanism let the request through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Already marked authenticated in the session context
    Context,
    Token,
    Fingerprint,
    Password,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::Context => "context",
            AuthMethod::Token => "token",
            AuthMethod::Fingerprint => "fingerprint",
            AuthMethod::Password => "password",
        }
    }
}

/// Non-fatal outcome of running the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Authenticated {
        method: AuthMethod,
        /// Newly sealed token to put in the URL; only after a password login
        issued_token: Option<String>,
    },
    AwaitingPassword {
        /// A submitted password was wrong
        rejected: bool,
        /// No password stored yet; the default password applies
        first_run: bool,
    },
}

impl GateOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, GateOutcome::Authenticated { .. })
    }
}

/// Outcome of a password change submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    /// The session is not flagged for a forced change
    NotRequired,
    Changed,
    /// One of the fields was empty
    Empty,
    /// The two fields differ
    Mismatch,
}

impl PasswordChange {
    /// User-facing message for the change form
    pub fn message(self) -> &'static str {
        match self {
            PasswordChange::NotRequired => "No password change is pending.",
            PasswordChange::Changed => {
                "Password changed. Use the new password from now on."
            }
            PasswordChange::Empty => "Enter the new password in both fields.",
            PasswordChange::Mismatch => "The two passwords do not match.",
        }
    }
}
