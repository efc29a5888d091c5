//! In-memory worksheet grid shared by the row store backends.

use serde::{Deserialize, Serialize};

use super::cell::CellRef;

/// A ragged grid of string cells. Rows may have different lengths, like a
/// spreadsheet export where trailing empty cells are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Worksheet {
    rows: Vec<Vec<String>>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: &[String]) -> Self {
        let mut sheet = Self::new();
        if !header.is_empty() {
            sheet.rows.push(header.to_vec());
        }
        sheet
    }

    /// Value of a cell; `None` when the cell was never written.
    pub fn cell(&self, cell: CellRef) -> Option<&str> {
        self.rows
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .map(String::as_str)
    }

    /// Write a cell, growing the grid as needed.
    pub fn set_cell(&mut self, cell: CellRef, value: &str) {
        if self.rows.len() <= cell.row {
            self.rows.resize_with(cell.row + 1, Vec::new);
        }
        let row = &mut self.rows[cell.row];
        if row.len() <= cell.col {
            row.resize(cell.col + 1, String::new());
        }
        row[cell.col] = value.to_string();
    }

    pub fn append(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Keep only the rows `keep` accepts; returns how many were dropped.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&[String]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row.as_slice()));
        before - self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
