use std::path::PathBuf;
use std::time::Instant;

use crate::app::ports::CatalogTablesPort;
use crate::app::StageSummary;
use crate::config::StoreProfiles;
use crate::error::Result;
use crate::metrics::ConsolidateMetrics;
use crate::pipeline::processing::consolidate::{Consolidator, StoreStatus};

/// Use case for merging every store export into the consolidated table
pub struct ConsolidateUseCase {
    profiles: StoreProfiles,
    data_dir: PathBuf,
    tables: Box<dyn CatalogTablesPort>,
}

impl ConsolidateUseCase {
    pub fn new(profiles: StoreProfiles, data_dir: impl Into<PathBuf>, tables: Box<dyn CatalogTablesPort>) -> Self {
        Self {
            profiles,
            data_dir: data_dir.into(),
            tables,
        }
    }

    pub fn run(&self) -> Result<StageSummary> {
        let started = Instant::now();
        let consolidation = Consolidator::new(&self.profiles).consolidate(&self.data_dir);

        let mut rows_in = 0;
        let mut stores_read = 0;
        let mut stores_skipped = 0;
        for report in &consolidation.stores {
            match &report.status {
                StoreStatus::Read {
                    rows_read,
                    rows_kept,
                    rows_dropped,
                    ..
                } => {
                    stores_read += 1;
                    rows_in += rows_read;
                    ConsolidateMetrics::record_store_read(&report.store, *rows_kept, *rows_dropped);
                }
                StoreStatus::Skipped(reason) => {
                    stores_skipped += 1;
                    ConsolidateMetrics::record_store_skipped(&report.store, *reason);
                }
            }
        }

        let written = self.tables.write_consolidated(&consolidation.items)?;
        ConsolidateMetrics::record_run(
            written.rows,
            consolidation.duplicates_removed,
            started.elapsed().as_secs_f64(),
        );

        let mut summary = StageSummary::new(
            "consolidate",
            rows_in,
            consolidation.rows_dropped + consolidation.duplicates_removed,
            written,
        );
        summary.stores_read = stores_read;
        summary.stores_skipped = stores_skipped;
        summary.log();
        Ok(summary)
    }
}
