use tracing::info;

use crate::app::consolidate_use_case::ConsolidateUseCase;
use crate::app::match_use_case::MatchUseCase;
use crate::app::normalize_use_case::NormalizeUseCase;
use crate::app::ports::CatalogTablesPort;
use crate::app::StageSummary;
use crate::config::{PipelineConfig, StoreProfiles};
use crate::error::Result;
use crate::infra::CsvTablesAdapter;

/// Wires the stage use cases to CSV tables in one data directory.
///
/// Stages run strictly one after another; each reads the table the
/// previous one wrote.
pub struct Pipeline {
    config: PipelineConfig,
    profiles: StoreProfiles,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, profiles: StoreProfiles) -> Self {
        Self { config, profiles }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn tables(&self) -> Box<dyn CatalogTablesPort> {
        Box::new(CsvTablesAdapter::new(self.config.clone()))
    }

    pub fn consolidate(&self) -> Result<StageSummary> {
        ConsolidateUseCase::new(self.profiles.clone(), self.config.data_dir.clone(), self.tables()).run()
    }

    pub fn normalize(&self) -> Result<StageSummary> {
        NormalizeUseCase::with_default_normalizer(self.tables()).run()
    }

    pub fn match_items(&self) -> Result<StageSummary> {
        MatchUseCase::new(self.tables()).run()
    }

    /// Run all three stages, stopping at the first stage that fails
    pub fn run_all(&self) -> Result<Vec<StageSummary>> {
        info!(
            data_dir = %self.config.data_dir.display(),
            stores = self.profiles.len(),
            "running full pipeline"
        );
        Ok(vec![self.consolidate()?, self.normalize()?, self.match_items()?])
    }
}
