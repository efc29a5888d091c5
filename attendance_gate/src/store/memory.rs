//! In-process row store.
//!
//! Used by tests and by single-process deployments that do not need the
//! records to survive a restart. Availability can be toggled to reproduce an
//! unreachable backend.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::RwLock;

use super::{
    RowStore,
    cell::CellRef,
    errors::{StoreError, StoreResult},
    worksheet::Worksheet,
};

/// Row store keeping every worksheet in memory
#[derive(Clone, Default)]
pub struct MemoryRowStore {
    sheets: Arc<RwLock<HashMap<String, Worksheet>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn ensure_sheet(&self, sheet: &str, header: &[String]) -> StoreResult<bool> {
        self.check_available()?;
        let mut sheets = self.sheets.write().await;
        if sheets.contains_key(sheet) {
            return Ok(false);
        }
        sheets.insert(sheet.to_string(), Worksheet::with_header(header));
        Ok(true)
    }

    async fn read_cell(&self, sheet: &str, cell: CellRef) -> StoreResult<Option<String>> {
        self.check_available()?;
        let sheets = self.sheets.read().await;
        Ok(sheets
            .get(sheet)
            .and_then(|ws| ws.cell(cell))
            .map(str::to_string))
    }

    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut sheets = self.sheets.write().await;
        sheets
            .entry(sheet.to_string())
            .or_default()
            .set_cell(cell, value);
        Ok(())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()> {
        self.check_available()?;
        let mut sheets = self.sheets.write().await;
        sheets.entry(sheet.to_string()).or_default().append(row);
        Ok(())
    }

    async fn read_all_rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        self.check_available()?;
        let sheets = self.sheets.read().await;
        Ok(sheets
            .get(sheet)
            .map(|ws| ws.rows().to_vec())
            .unwrap_or_default())
    }

    async fn retain_rows(
        &self,
        sheet: &str,
        keep: &(dyn for<'r> Fn(&'r [String]) -> bool + Send + Sync),
    ) -> StoreResult<usize> {
        self.check_available()?;
        let mut sheets = self.sheets.write().await;
        Ok(sheets.get_mut(sheet).map_or(0, |ws| ws.retain(keep)))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
