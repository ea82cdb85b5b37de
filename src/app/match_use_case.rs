use std::time::Instant;
use tracing::warn;

use crate::app::ports::CatalogTablesPort;
use crate::app::StageSummary;
use crate::error::Result;
use crate::metrics::MatchMetrics;
use crate::pipeline::processing::matching::IdentityResolver;

/// Use case for assigning one shared id per product across stores
pub struct MatchUseCase {
    tables: Box<dyn CatalogTablesPort>,
}

impl MatchUseCase {
    pub fn new(tables: Box<dyn CatalogTablesPort>) -> Self {
        Self { tables }
    }

    pub fn run(&self) -> Result<StageSummary> {
        let started = Instant::now();
        let input = self.tables.read_normalized()?;
        if input.missing {
            warn!("normalized table missing, writing an empty matched table");
        }

        let rows_in = input.rows.len() + input.malformed;
        let (matched, report) = IdentityResolver::new().resolve(input.rows);
        if !report.is_consistent() {
            MatchMetrics::record_inconsistency();
        }

        let written = self.tables.write_matched(&matched)?;
        MatchMetrics::record_run(
            written.rows,
            report.distinct_signatures,
            report.split_groups,
            started.elapsed().as_secs_f64(),
        );

        let summary = StageSummary::new("match", rows_in, input.malformed, written);
        summary.log();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::MemoryTables;
    use crate::domain::{NormalizedItem, Price};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn row(id: u64, name: &str, store: &str, unit: &str) -> NormalizedItem {
        NormalizedItem {
            id,
            name: name.to_string(),
            price: Price::from_cents(100),
            store: store.to_string(),
            brand: None,
            net_quantity: None,
            unit_of_measure: None,
            category: None,
            standardized_quantity: Some(1000.0),
            standardized_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_matched_table_has_one_id_per_signature() {
        let tables = Arc::new(MemoryTables::default());
        *tables.normalized.lock().unwrap() = Some(vec![
            row(1, "mlijeko 1l", "spar", "ml"),
            row(1, "mlijeko 1l", "tommy", "ml"),
            row(1, "mlijeko 1l", "lidl", "g"),
            row(2, "kruh", "lidl", "g"),
        ]);

        let summary = MatchUseCase::new(Box::new(tables.clone())).run().unwrap();
        assert_eq!(summary.rows_in, 4);
        assert_eq!(summary.rows_out, 4);

        let matched = tables.matched.lock().unwrap().clone().unwrap();
        assert_eq!(matched[0].id, matched[1].id);
        assert_ne!(matched[0].id, matched[2].id);
        let ids: HashSet<_> = matched.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_missing_input_writes_empty_table() {
        let tables = Arc::new(MemoryTables::default());
        let summary = MatchUseCase::new(Box::new(tables.clone())).run().unwrap();
        assert_eq!(summary.rows_out, 0);
        assert!(tables.matched.lock().unwrap().is_some());
    }
}
