//! Metrics infrastructure for the catalog pipeline
//!
//! Each pipeline phase owns its metrics in a dedicated submodule so names
//! stay unique and documented in one place.

pub mod api;
pub mod consolidate;
pub mod matching;
pub mod normalize;
pub mod registry;

pub use api::ApiMetrics;
pub use consolidate::ConsolidateMetrics;
pub use matching::MatchMetrics;
pub use normalize::NormalizeMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. Rendering happens in-process through [`render`], which the
/// HTTP server exposes on `/metrics`.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let handle = HANDLE.get_or_init(|| handle).clone();
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Current metrics snapshot in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Pre-register every metric of the phase so it shows up before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    /// Documentation for every metric of the phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following catalog_{phase}_{name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_metric_names() {
        assert_eq!(
            phase_metric!(counter, "consolidate", "rows_kept"),
            "catalog_consolidate_rows_kept_total"
        );
        assert_eq!(
            phase_metric!(histogram, "match", "duration_seconds"),
            "catalog_match_duration_seconds"
        );
    }

    #[test]
    fn test_init_is_idempotent_and_renders() {
        let first = init_metrics();
        let second = init_metrics();
        assert_eq!(first.is_some(), second.is_some());
        if first.is_some() {
            ConsolidateMetrics::record_run(3, 1, 0.01);
            let text = render().unwrap_or_default();
            assert!(text.contains("catalog_consolidate_runs_total"));
        }
    }
}
