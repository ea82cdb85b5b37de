use std::path::PathBuf;

use crate::domain::{ConsolidatedItem, MatchedItem, NormalizedItem};
use crate::error::Result;

/// Rows read from one stage table
#[derive(Debug, Clone)]
pub struct TableRead<T> {
    pub rows: Vec<T>,
    /// Rows that failed to deserialize and were skipped
    pub malformed: usize,
    /// The table did not exist and was treated as empty
    pub missing: bool,
}

impl<T> TableRead<T> {
    pub fn empty_missing() -> Self {
        Self {
            rows: Vec::new(),
            malformed: 0,
            missing: true,
        }
    }
}

/// Receipt for one fully written stage table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWritten {
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Storage for the three pipeline tables. Writes replace the table
/// atomically; readers never observe a partial file.
pub trait CatalogTablesPort: Send + Sync {
    fn read_consolidated(&self) -> Result<TableRead<ConsolidatedItem>>;
    fn write_consolidated(&self, rows: &[ConsolidatedItem]) -> Result<TableWritten>;

    fn read_normalized(&self) -> Result<TableRead<NormalizedItem>>;
    fn write_normalized(&self, rows: &[NormalizedItem]) -> Result<TableWritten>;

    fn write_matched(&self, rows: &[MatchedItem]) -> Result<TableWritten>;
}

impl<T: CatalogTablesPort + ?Sized> CatalogTablesPort for std::sync::Arc<T> {
    fn read_consolidated(&self) -> Result<TableRead<ConsolidatedItem>> {
        (**self).read_consolidated()
    }

    fn write_consolidated(&self, rows: &[ConsolidatedItem]) -> Result<TableWritten> {
        (**self).write_consolidated(rows)
    }

    fn read_normalized(&self) -> Result<TableRead<NormalizedItem>> {
        (**self).read_normalized()
    }

    fn write_normalized(&self, rows: &[NormalizedItem]) -> Result<TableWritten> {
        (**self).write_normalized(rows)
    }

    fn write_matched(&self, rows: &[MatchedItem]) -> Result<TableWritten> {
        (**self).write_matched(rows)
    }
}
