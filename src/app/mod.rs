pub mod consolidate_use_case;
pub mod match_use_case;
pub mod normalize_use_case;
pub mod ports;

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::TableWritten;

/// What one pipeline stage consumed and produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub stage: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub rows_dropped: usize,
    pub stores_read: usize,
    pub stores_skipped: usize,
    pub output: PathBuf,
    /// Hex SHA-256 of the written table; equal across reruns on unchanged input
    pub sha256: String,
}

impl StageSummary {
    pub fn new(stage: &'static str, rows_in: usize, rows_dropped: usize, written: TableWritten) -> Self {
        Self {
            stage,
            rows_in,
            rows_out: written.rows,
            rows_dropped,
            stores_read: 0,
            stores_skipped: 0,
            output: written.path,
            sha256: written.sha256,
        }
    }

    pub fn log(&self) {
        info!(
            stage = self.stage,
            rows_in = self.rows_in,
            rows_out = self.rows_out,
            rows_dropped = self.rows_dropped,
            stores_read = self.stores_read,
            stores_skipped = self.stores_skipped,
            output = %self.output.display(),
            sha256 = %self.sha256,
            "stage complete"
        );
    }
}
