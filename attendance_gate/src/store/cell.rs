//! A1-notation cell references.

use super::errors::{StoreError, StoreResult};
use std::{fmt, str::FromStr};

/// Zero-based cell coordinates parsed from A1 notation (`A1`, `C12`, `AB3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    /// Parse an A1 reference. Column letters are case-insensitive.
    pub fn parse(reference: &str) -> StoreResult<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| StoreError::InvalidCell(reference.to_string()))?;
        let (letters, digits) = reference.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(StoreError::InvalidCell(reference.to_string()));
        }

        let mut col: usize = 0;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(|| StoreError::InvalidCell(reference.to_string()))?;
        }

        let row: usize = digits
            .parse()
            .map_err(|_| StoreError::InvalidCell(reference.to_string()))?;
        if row == 0 {
            return Err(StoreError::InvalidCell(reference.to_string()));
        }

        Ok(Self {
            row: row - 1,
            col: col - 1,
        })
    }
}

impl FromStr for CellRef {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.reverse();
        write!(f, "{}{}", letters.into_iter().collect::<String>(), self.row + 1)
    }
}
