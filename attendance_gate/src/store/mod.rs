//! Row store module: the spreadsheet-like persistence behind the gate.
//!
//! The authenticator treats its backend as a row-oriented append log with a
//! couple of addressable cells. It needs no ordering, indexing or
//! transactions, only:
//! - read / write a single cell
//! - append a row
//! - read all rows of a worksheet
//!
//! Two backends are provided: [`MemoryRowStore`] for tests and ephemeral
//! deployments, and [`FileRowStore`] which keeps one JSON file per worksheet.

use async_trait::async_trait;

pub mod cell;
pub mod config;
pub mod errors;
pub mod file;
pub mod memory;
pub mod repository;
pub mod timeouts;
pub mod worksheet;

pub use cell::CellRef;
pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use file::FileRowStore;
pub use memory::MemoryRowStore;
pub use repository::{RecordRepository, SheetRecordRepository};
pub use worksheet::Worksheet;

/// Worksheet-oriented storage backend
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Create `sheet` with an optional header row if it does not exist yet.
    /// Returns `true` when the sheet was created by this call.
    async fn ensure_sheet(&self, sheet: &str, header: &[String]) -> StoreResult<bool>;

    /// Read a single cell; `None` when the sheet or cell is missing
    async fn read_cell(&self, sheet: &str, cell: CellRef) -> StoreResult<Option<String>>;

    /// Write a single cell
    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> StoreResult<()>;

    /// Append one row at the end of the sheet
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()>;

    /// Every row of the sheet, header included
    async fn read_all_rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Drop every row for which `keep` returns `false`, in one step that no
    /// concurrent append can interleave with. Returns how many rows were removed.
    async fn retain_rows(
        &self,
        sheet: &str,
        keep: &(dyn for<'r> Fn(&'r [String]) -> bool + Send + Sync),
    ) -> StoreResult<usize>;

    /// Cheap reachability check
    async fn ping(&self) -> StoreResult<()>;
}
