//! Session authenticator implementation.

use super::{
    cipher::SecretCipher,
    config::{AuthConfig, DEFAULT_SESSION_DAYS},
    errors::{AuthError, AuthResult},
    fingerprint::{self, hash_session_id},
    models::{
        AuthMethod, CredentialRecord, GateOutcome, GateState, PasswordChange, RecordCheck,
        RecordKind, RequestContext, SessionContext, TokenClaims,
    },
};
use crate::store::RecordRepository;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Random bytes in a session id
const SESSION_ID_BYTES: usize = 32;

/// Gate deciding, once per request, whether the caller may proceed
#[derive(Clone)]
pub struct Authenticator {
    repository: Arc<dyn RecordRepository>,
    cipher: Option<SecretCipher>,
    default_password: Option<String>,
    session_duration: Duration,
}

/// Password the submission is compared against
struct ExpectedPassword {
    password: String,
    first_run: bool,
}

impl Authenticator {
    /// Create a new authenticator
    ///
    /// The encryption key is derived here, once. A missing secret is not an
    /// error at construction time: every later request is blocked instead,
    /// so the host can still start and show the operator what is wrong.
    ///
    /// # Arguments
    ///
    /// * `repository` - Persistence for the stored password and records
    /// * `config` - Secrets and session lifetime
    pub fn new(repository: Arc<dyn RecordRepository>, config: AuthConfig) -> Self {
        let cipher = config
            .encryption_key
            .as_deref()
            .and_then(|secret| SecretCipher::from_secret(secret).ok());

        if cipher.is_none() {
            log::error!("ENCRYPTION_KEY is not configured; every request will be blocked");
        }

        Self {
            repository,
            cipher,
            default_password: config.default_password,
            session_duration: Duration::try_days(config.session_days)
                .unwrap_or_else(|| Duration::days(DEFAULT_SESSION_DAYS)),
        }
    }

    /// Whether the encryption key could be derived
    pub fn is_configured(&self) -> bool {
        self.cipher.is_some()
    }

    /// Lifetime of newly issued records
    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    /// Run the gate for one request
    ///
    /// # Arguments
    ///
    /// * `ctx` - Per-request session state, updated in place
    /// * `request` - Query token and headers of the request
    /// * `submission` - Password typed into the prompt, if any
    ///
    /// # Returns
    ///
    /// * `AuthResult<GateOutcome>` - Authenticated or awaiting a password
    ///
    /// # Errors
    ///
    /// Errors are fatal for the request (the BLOCKED state):
    /// * `AuthError::MissingEncryptionKey` - No secret configured
    /// * `AuthError::MissingDefaultPassword` - First run without a default
    /// * `AuthError::Store` - Stored password could not be read
    pub async fn check(
        &self,
        ctx: &mut SessionContext,
        request: &RequestContext,
        submission: Option<&str>,
    ) -> AuthResult<GateOutcome> {
        self.check_at(ctx, request, submission, Utc::now()).await
    }

    /// [`Authenticator::check`] against an explicit clock
    pub async fn check_at(
        &self,
        ctx: &mut SessionContext,
        request: &RequestContext,
        submission: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<GateOutcome> {
        if ctx.authenticated {
            return Ok(GateOutcome::Authenticated {
                method: AuthMethod::Context,
                issued_token: None,
            });
        }

        let cipher = self.cipher().inspect_err(|_| {
            transition(GateState::Unchecked, GateState::Blocked);
        })?;
        let now_ts = now.timestamp();

        transition(GateState::Unchecked, GateState::CheckingToken);
        if self.check_token(cipher, request, now_ts).await == RecordCheck::Matched {
            return Ok(self.admit_bypass(ctx, cipher, AuthMethod::Token).await);
        }

        transition(GateState::CheckingToken, GateState::CheckingFingerprint);
        if self.check_fingerprint(request, now_ts).await == RecordCheck::Matched {
            return Ok(self.admit_bypass(ctx, cipher, AuthMethod::Fingerprint).await);
        }

        transition(GateState::CheckingFingerprint, GateState::CheckingPassword);
        self.check_password(ctx, cipher, request, submission, now)
            .await
            .inspect_err(|_| transition(GateState::CheckingPassword, GateState::Blocked))
    }

    /// Handle the forced password change after a first-run login
    ///
    /// # Returns
    ///
    /// * `PasswordChange::NotRequired` - Session is not flagged
    /// * `PasswordChange::Empty` / `Mismatch` - Re-prompt, flag kept
    /// * `PasswordChange::Changed` - Password stored, flag cleared
    ///
    /// # Errors
    ///
    /// * `AuthError::Store` - Password could not be written; flag kept
    pub async fn change_password(
        &self,
        ctx: &mut SessionContext,
        new_password: &str,
        confirmation: &str,
    ) -> AuthResult<PasswordChange> {
        if !ctx.must_change_password {
            return Ok(PasswordChange::NotRequired);
        }
        if new_password.is_empty() || confirmation.is_empty() {
            return Ok(PasswordChange::Empty);
        }
        if new_password != confirmation {
            return Ok(PasswordChange::Mismatch);
        }

        self.set_stored_password(new_password).await?;
        ctx.must_change_password = false;
        info!("Entry password changed");
        Ok(PasswordChange::Changed)
    }

    /// Encrypt and overwrite the stored password
    pub async fn set_stored_password(&self, plain_password: &str) -> AuthResult<()> {
        let ciphertext = self.cipher()?.encrypt(plain_password)?;
        self.repository.set_stored_password(&ciphertext).await?;
        Ok(())
    }

    /// Remove records that are already expired. Returns the number removed.
    pub async fn purge_expired_records(&self) -> AuthResult<usize> {
        let removed = self
            .repository
            .purge_expired(Utc::now().timestamp())
            .await?;
        if removed > 0 {
            info!("Purged {} expired session/fingerprint record(s)", removed);
        }
        Ok(removed)
    }

    /// Check that the record store answers
    pub async fn health_check(&self) -> AuthResult<()> {
        self.repository.health_check().await?;
        Ok(())
    }

    fn cipher(&self) -> AuthResult<&SecretCipher> {
        self.cipher.as_ref().ok_or(AuthError::MissingEncryptionKey)
    }

    async fn check_token(
        &self,
        cipher: &SecretCipher,
        request: &RequestContext,
        now: i64,
    ) -> RecordCheck {
        let Some(token) = request.token() else {
            return RecordCheck::NotFound;
        };
        let Some(claims) = cipher.open_token(token) else {
            debug!("Ignoring session token that does not decrypt");
            return RecordCheck::NotFound;
        };
        if claims.exp <= now {
            debug!("Ignoring expired session token");
            return RecordCheck::NotFound;
        }

        self.lookup(RecordKind::Session, &hash_session_id(&claims.id), now)
            .await
    }

    async fn check_fingerprint(&self, request: &RequestContext, now: i64) -> RecordCheck {
        match fingerprint::derive(request) {
            Some(hash) => self.lookup(RecordKind::Fingerprint, &hash, now).await,
            None => RecordCheck::NotFound,
        }
    }

    async fn lookup(&self, kind: RecordKind, hash: &str, now: i64) -> RecordCheck {
        match self.repository.has_valid_record(kind, hash, now).await {
            Ok(true) => RecordCheck::Matched,
            Ok(false) => RecordCheck::NotFound,
            Err(e) => {
                warn!("Record lookup ({}) failed, skipping: {}", kind.code(), e);
                RecordCheck::StoreUnavailable
            }
        }
    }

    async fn admit_bypass(
        &self,
        ctx: &mut SessionContext,
        cipher: &SecretCipher,
        method: AuthMethod,
    ) -> GateOutcome {
        ctx.authenticated = true;
        // Hosts are stateless between requests: a first-run login must keep
        // forcing the change until a password is actually stored.
        match self.read_stored_password(cipher).await {
            Ok(None) => ctx.must_change_password = true,
            Ok(Some(_)) => {}
            Err(e) => warn!(
                "Admitted via {} without reading the stored password: {}",
                method.as_str(),
                e
            ),
        }

        debug!("Gate {} via {}", GateState::Authenticated, method.as_str());
        GateOutcome::Authenticated {
            method,
            issued_token: None,
        }
    }

    async fn check_password(
        &self,
        ctx: &mut SessionContext,
        cipher: &SecretCipher,
        request: &RequestContext,
        submission: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<GateOutcome> {
        let expected = self.expected_password(cipher).await?;
        let first_run = expected.first_run;

        let Some(submitted) = submission else {
            return Ok(GateOutcome::AwaitingPassword {
                rejected: false,
                first_run,
            });
        };

        let matches: bool = submitted
            .as_bytes()
            .ct_eq(expected.password.as_bytes())
            .into();
        if !matches {
            info!("Rejected entry password attempt");
            return Ok(GateOutcome::AwaitingPassword {
                rejected: true,
                first_run,
            });
        }

        ctx.authenticated = true;
        if first_run {
            ctx.must_change_password = true;
        }

        let issued_token = match self.issue_session(cipher, request, now).await {
            Ok(token) => {
                ctx.show_bookmark_hint = true;
                Some(token)
            }
            Err(e) => {
                warn!("Logged in but could not issue a session token: {}", e);
                None
            }
        };

        info!("Entry password accepted (first run: {})", first_run);
        Ok(GateOutcome::Authenticated {
            method: AuthMethod::Password,
            issued_token,
        })
    }

    async fn expected_password(&self, cipher: &SecretCipher) -> AuthResult<ExpectedPassword> {
        if let Some(password) = self.read_stored_password(cipher).await? {
            return Ok(ExpectedPassword {
                password,
                first_run: false,
            });
        }

        let password = self
            .default_password
            .clone()
            .ok_or(AuthError::MissingDefaultPassword)?;
        Ok(ExpectedPassword {
            password,
            first_run: true,
        })
    }

    /// Stored password in plaintext. A value that no longer decrypts (the
    /// secret was rotated) counts as absent, so the first-run flow can
    /// re-seal it under the current key.
    async fn read_stored_password(&self, cipher: &SecretCipher) -> AuthResult<Option<String>> {
        let Some(ciphertext) = self.repository.stored_password().await? else {
            return Ok(None);
        };
        match cipher.decrypt(&ciphertext) {
            Ok(password) => Ok(Some(password)),
            Err(_) => {
                warn!("Stored password does not decrypt with the current key; treating as first run");
                Ok(None)
            }
        }
    }

    async fn issue_session(
        &self,
        cipher: &SecretCipher,
        request: &RequestContext,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let expires_at = now
            .checked_add_signed(self.session_duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp();
        let session_id = new_session_id();

        self.repository
            .append_record(&CredentialRecord {
                hash: hash_session_id(&session_id),
                expires_at,
                kind: RecordKind::Session,
            })
            .await?;

        let token = cipher.seal_token(&TokenClaims {
            id: session_id,
            exp: expires_at,
        })?;

        if let Some(hash) = fingerprint::derive(request) {
            let record = CredentialRecord {
                hash,
                expires_at,
                kind: RecordKind::Fingerprint,
            };
            if let Err(e) = self.repository.append_record(&record).await {
                warn!("Could not record browser fingerprint: {}", e);
            }
        }

        Ok(token)
    }
}

fn new_session_id() -> String {
    let bytes: [u8; SESSION_ID_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn transition(from: GateState, to: GateState) {
    debug!("Gate {} -> {}", from, to);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRowStore, RowStore, SheetRecordRepository, repository::SESSIONS_SHEET};

    const SECRET: &str = "unit-test-secret";

    fn setup(default_password: Option<&str>) -> (MemoryRowStore, Authenticator) {
        let store = MemoryRowStore::new();
        let repository = SheetRecordRepository::new(
            Arc::new(store.clone()),
            std::time::Duration::from_secs(5),
        );
        let config = AuthConfig {
            encryption_key: Some(SECRET.to_string()),
            default_password: default_password.map(str::to_string),
            session_days: 30,
        };
        (store, Authenticator::new(Arc::new(repository), config))
    }

    async fn record_rows(store: &MemoryRowStore) -> Vec<Vec<String>> {
        store
            .read_all_rows(SESSIONS_SHEET)
            .await
            .unwrap()
            .into_iter()
            .skip(1)
            .collect()
    }

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_session_ids_are_unique_and_urlsafe() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_context_flag_short_circuits() {
        let (store, auth) = setup(Some("welcome1"));
        store.set_available(false);

        let mut ctx = SessionContext {
            authenticated: true,
            ..Default::default()
        };
        let outcome = auth
            .check(&mut ctx, &RequestContext::new(), None)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GateOutcome::Authenticated {
                method: AuthMethod::Context,
                issued_token: None
            }
        );
    }

    #[tokio::test]
    async fn test_missing_key_blocks() {
        let store = MemoryRowStore::new();
        let repository =
            SheetRecordRepository::new(Arc::new(store), std::time::Duration::from_secs(5));
        let auth = Authenticator::new(Arc::new(repository), AuthConfig::default());

        assert!(!auth.is_configured());
        let result = auth
            .check(&mut SessionContext::new(), &RequestContext::new(), Some("x"))
            .await;
        assert!(matches!(result, Err(AuthError::MissingEncryptionKey)));
    }

    #[tokio::test]
    async fn test_session_record_expiry_matches_lifetime() {
        let (store, auth) = setup(Some("welcome1"));
        let now = at(1_700_000_000);

        let mut ctx = SessionContext::new();
        let outcome = auth
            .check_at(&mut ctx, &RequestContext::new(), Some("welcome1"), now)
            .await
            .unwrap();
        assert!(outcome.is_authenticated());

        let rows = record_rows(&store).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], (1_700_000_000 + 30 * 86_400).to_string());
        assert_eq!(rows[0][2], "s");
    }

    #[tokio::test]
    async fn test_expired_token_claims_are_ignored() {
        let (_store, auth) = setup(Some("welcome1"));
        let cipher = auth.cipher().unwrap().clone();
        let token = cipher
            .seal_token(&TokenClaims {
                id: "id".to_string(),
                exp: 100,
            })
            .unwrap();

        let request = RequestContext::new().with_session_token(token);
        let check = auth.check_token(&cipher, &request, 100).await;
        assert_eq!(check, RecordCheck::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_reports_store_unavailable() {
        let (store, auth) = setup(Some("welcome1"));
        store.set_available(false);
        let check = auth.lookup(RecordKind::Session, "h", 0).await;
        assert_eq!(check, RecordCheck::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_change_password_requires_flag() {
        let (_store, auth) = setup(Some("welcome1"));
        let mut ctx = SessionContext::new();
        let result = auth.change_password(&mut ctx, "abc", "abc").await.unwrap();
        assert_eq!(result, PasswordChange::NotRequired);
    }
}
