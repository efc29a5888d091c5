//! Repository over the row store for the authenticator's persisted state.
//!
//! Two worksheets are used:
//! - `config`: cell `A1` holds the encrypted entry password
//! - `sessions`: header `sid | exp | typ`, one row per session or
//!   fingerprint record
//!
//! Lookups are full linear scans; the number of live records is expected to
//! stay small.

use async_trait::async_trait;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use super::{
    RowStore,
    cell::CellRef,
    errors::StoreResult,
    timeouts::{COMPACTION_TIMEOUT, with_timeout},
};
use crate::auth::{CredentialRecord, RecordKind};

/// Worksheet holding the stored password
pub const CONFIG_SHEET: &str = "config";

/// Worksheet holding session and fingerprint records
pub const SESSIONS_SHEET: &str = "sessions";

/// Cell of the config sheet holding the encrypted password
pub const PASSWORD_CELL: &str = "A1";

/// Header row of the sessions sheet
pub const SESSIONS_HEADER: [&str; 3] = ["sid", "exp", "typ"];

/// Trait for the authenticator's persistence operations
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Read the encrypted password; `None` when never set (first run)
    async fn stored_password(&self) -> StoreResult<Option<String>>;

    /// Overwrite the encrypted password
    async fn set_stored_password(&self, ciphertext: &str) -> StoreResult<()>;

    /// Append a session or fingerprint record
    async fn append_record(&self, record: &CredentialRecord) -> StoreResult<()>;

    /// Whether any record of `kind` with `hash` is still valid at `now`
    async fn has_valid_record(&self, kind: RecordKind, hash: &str, now: i64)
    -> StoreResult<bool>;

    /// Drop records that expired at or before `now`; returns how many were removed
    async fn purge_expired(&self, now: i64) -> StoreResult<usize>;

    /// Check that the backend answers
    async fn health_check(&self) -> StoreResult<()>;
}

/// `RecordRepository` backed by any [`RowStore`]
pub struct SheetRecordRepository {
    store: Arc<dyn RowStore>,
    timeout: Duration,
    config_ready: AtomicBool,
}

impl SheetRecordRepository {
    pub fn new(store: Arc<dyn RowStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            config_ready: AtomicBool::new(false),
        }
    }

    async fn ensure_config_sheet(&self) -> StoreResult<()> {
        if self.config_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        with_timeout(self.timeout, self.store.ensure_sheet(CONFIG_SHEET, &[])).await?;
        self.config_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Not cached: the sheet may be removed behind our back, and an append
    /// must never recreate it without its header.
    async fn ensure_sessions_sheet(&self) -> StoreResult<()> {
        let header: Vec<String> = SESSIONS_HEADER.iter().map(|h| h.to_string()).collect();
        with_timeout(self.timeout, self.store.ensure_sheet(SESSIONS_SHEET, &header)).await?;
        Ok(())
    }

    fn password_cell() -> StoreResult<CellRef> {
        CellRef::parse(PASSWORD_CELL)
    }
}

#[async_trait]
impl RecordRepository for SheetRecordRepository {
    async fn stored_password(&self) -> StoreResult<Option<String>> {
        self.ensure_config_sheet().await?;
        let value = with_timeout(
            self.timeout,
            self.store.read_cell(CONFIG_SHEET, Self::password_cell()?),
        )
        .await?;

        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn set_stored_password(&self, ciphertext: &str) -> StoreResult<()> {
        self.ensure_config_sheet().await?;
        with_timeout(
            self.timeout,
            self.store
                .write_cell(CONFIG_SHEET, Self::password_cell()?, ciphertext),
        )
        .await
    }

    async fn append_record(&self, record: &CredentialRecord) -> StoreResult<()> {
        self.ensure_sessions_sheet().await?;
        with_timeout(
            self.timeout,
            self.store.append_row(SESSIONS_SHEET, record.to_row()),
        )
        .await
    }

    async fn has_valid_record(
        &self,
        kind: RecordKind,
        hash: &str,
        now: i64,
    ) -> StoreResult<bool> {
        let rows = with_timeout(self.timeout, self.store.read_all_rows(SESSIONS_SHEET)).await?;

        // The header never parses as a record, wherever it sits
        Ok(rows
            .iter()
            .filter_map(|row| CredentialRecord::from_row(row))
            .any(|record| record.hash == hash && record.is_valid_at(kind, now)))
    }

    async fn purge_expired(&self, now: i64) -> StoreResult<usize> {
        // Rows that do not parse (the header included) are kept untouched
        let keep = move |row: &[String]| {
            CredentialRecord::from_row(row).is_none_or(|record| record.expires_at > now)
        };
        with_timeout(
            COMPACTION_TIMEOUT.max(self.timeout),
            self.store.retain_rows(SESSIONS_SHEET, &keep),
        )
        .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(self.timeout, self.store.ping()).await
    }
}
