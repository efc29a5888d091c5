//! File-backed row store.
//!
//! Each worksheet is one JSON file (`<data_dir>/<sheet>.json`) holding the
//! row grid. Writes go to a temporary file that is renamed over the original,
//! so a crash mid-write leaves the previous version intact.

use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};

use super::{
    RowStore,
    cell::CellRef,
    config::StoreConfig,
    errors::{StoreError, StoreResult},
    worksheet::Worksheet,
};

/// Row store persisting worksheets as JSON files in a directory
pub struct FileRowStore {
    data_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileRowStore {
    /// Open (and create if needed) the worksheet directory
    ///
    /// # Arguments
    ///
    /// * `config` - Store configuration
    ///
    /// # Returns
    ///
    /// * `StoreResult<FileRowStore>` - Store or I/O error
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir).await?;
        Ok(Self {
            data_dir: config.data_dir.clone(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn sheet_path(&self, sheet: &str) -> StoreResult<PathBuf> {
        let valid = !sheet.is_empty()
            && sheet
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidSheet(sheet.to_string()));
        }
        Ok(self.data_dir.join(format!("{sheet}.json")))
    }

    async fn load(&self, sheet: &str) -> StoreResult<Option<Worksheet>> {
        let path = self.sheet_path(sheet)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, sheet: &str, worksheet: &Worksheet) -> StoreResult<()> {
        let path = self.sheet_path(sheet)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(worksheet)?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn modify<F>(&self, sheet: &str, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Worksheet) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut worksheet = self.load(sheet).await?.unwrap_or_default();
        apply(&mut worksheet);
        self.save(sheet, &worksheet).await
    }
}

#[async_trait]
impl RowStore for FileRowStore {
    async fn ensure_sheet(&self, sheet: &str, header: &[String]) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.load(sheet).await?.is_some() {
            return Ok(false);
        }
        self.save(sheet, &Worksheet::with_header(header)).await?;
        log::info!("Created worksheet '{}' in {}", sheet, self.data_dir.display());
        Ok(true)
    }

    async fn read_cell(&self, sheet: &str, cell: CellRef) -> StoreResult<Option<String>> {
        Ok(self
            .load(sheet)
            .await?
            .and_then(|ws| ws.cell(cell).map(str::to_string)))
    }

    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> StoreResult<()> {
        self.modify(sheet, |ws| ws.set_cell(cell, value)).await
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()> {
        self.modify(sheet, |ws| ws.append(row)).await
    }

    async fn read_all_rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        Ok(self
            .load(sheet)
            .await?
            .map(|ws| ws.rows().to_vec())
            .unwrap_or_default())
    }

    async fn retain_rows(
        &self,
        sheet: &str,
        keep: &(dyn for<'r> Fn(&'r [String]) -> bool + Send + Sync),
    ) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let Some(mut worksheet) = self.load(sheet).await? else {
            return Ok(0);
        };
        let removed = worksheet.retain(keep);
        if removed > 0 {
            self.save(sheet, &worksheet).await?;
        }
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        let meta = fs::metadata(&self.data_dir).await?;
        if !meta.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.data_dir.display()
            )));
        }
        Ok(())
    }
}
