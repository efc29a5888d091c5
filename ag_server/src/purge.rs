//! Periodic compaction of expired session and fingerprint records.
//!
//! Records are append-only, so without this job the sessions sheet grows
//! with every login. The job is opt-in (`SESSION_PURGE_INTERVAL_SECS`).

use attendance_gate::{AuthResult, Authenticator};
use std::{sync::Arc, time::Duration, time::Instant};
use tokio::{task::JoinHandle, time::interval};

use crate::{logging, metrics};

/// Run one purge pass and record its metrics
pub async fn purge_once(authenticator: &Authenticator) -> AuthResult<usize> {
    let started = Instant::now();
    let removed = authenticator.purge_expired_records().await?;

    metrics::records_purged_total(removed);
    logging::log_performance(
        "purge_expired_records",
        started.elapsed().as_millis() as u64,
        Some("sessions"),
    );
    Ok(removed)
}

/// Spawn the purge loop. The first pass runs immediately.
pub fn spawn(authenticator: Arc<Authenticator>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Record purge every {}s", period.as_secs());
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;
            match purge_once(&authenticator).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed = removed, "Purged expired records");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Record purge failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_gate::{
        AuthConfig, MemoryRowStore, RecordRepository, SheetRecordRepository,
        auth::{CredentialRecord, RecordKind},
    };

    #[tokio::test]
    async fn test_purge_once_counts_removed_rows() {
        let store = Arc::new(MemoryRowStore::new());
        let repository = Arc::new(SheetRecordRepository::new(
            store.clone(),
            Duration::from_secs(5),
        ));
        repository
            .append_record(&CredentialRecord {
                hash: "gone".to_string(),
                expires_at: 10,
                kind: RecordKind::Fingerprint,
            })
            .await
            .unwrap();

        let authenticator = Authenticator::new(repository, AuthConfig::default());
        assert_eq!(purge_once(&authenticator).await.unwrap(), 1);
        assert_eq!(purge_once(&authenticator).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_once_reports_store_errors() {
        let store = Arc::new(MemoryRowStore::new());
        store.set_available(false);
        let repository = Arc::new(SheetRecordRepository::new(
            store.clone(),
            Duration::from_secs(5),
        ));
        let authenticator = Authenticator::new(repository, AuthConfig::default());
        assert!(purge_once(&authenticator).await.is_err());
    }
}
