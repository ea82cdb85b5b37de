use std::time::Instant;
use tracing::warn;

use crate::app::ports::CatalogTablesPort;
use crate::app::StageSummary;
use crate::error::Result;
use crate::metrics::NormalizeMetrics;
use crate::pipeline::processing::normalize::{normalize_all, DefaultNormalizer, Normalizer};

/// Use case for turning the consolidated table into the normalized table
pub struct NormalizeUseCase {
    normalizer: Box<dyn Normalizer>,
    tables: Box<dyn CatalogTablesPort>,
}

impl NormalizeUseCase {
    pub fn new(normalizer: Box<dyn Normalizer>, tables: Box<dyn CatalogTablesPort>) -> Self {
        Self { normalizer, tables }
    }

    /// Create a use case with the default normalizer
    pub fn with_default_normalizer(tables: Box<dyn CatalogTablesPort>) -> Self {
        Self::new(Box::new(DefaultNormalizer::new()), tables)
    }

    pub fn run(&self) -> Result<StageSummary> {
        let started = Instant::now();
        let input = self.tables.read_consolidated()?;
        if input.missing {
            warn!("consolidated table missing, writing an empty normalized table");
        }

        let rows_in = input.rows.len() + input.malformed;
        let outcome = normalize_all(self.normalizer.as_ref(), &input.rows);
        let without_quantity = outcome
            .items
            .iter()
            .filter(|item| item.standardized_quantity.is_none())
            .count();

        let written = self.tables.write_normalized(&outcome.items)?;
        NormalizeMetrics::record_run(rows_in, written.rows, without_quantity, started.elapsed().as_secs_f64());

        let summary = StageSummary::new("normalize", rows_in, outcome.dropped + input.malformed, written);
        summary.log();
        Ok(summary)
    }
}
