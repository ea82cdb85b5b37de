//! Registration of every phase's metrics, with a duplicate-name check

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::ConsolidateMetrics>(&mut all_metrics);
    register_phase_metrics::<super::NormalizeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::MatchMetrics>(&mut all_metrics);
    register_phase_metrics::<super::ApiMetrics>(&mut all_metrics);

    info!("Registered {} metrics across all phases", all_metrics.len());
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, (&'static str, MetricDoc)>) {
    T::register_metrics();
    let phase = T::phase_name();

    for doc in T::metrics_documentation() {
        if let Some((owner, _)) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' is defined by both '{}' and '{}'",
                doc.name, owner, phase
            );
            continue;
        }
        debug!(metric = doc.name, phase, kind = ?doc.metric_type, labels = ?doc.labels, "{}", doc.help);
        all_metrics.insert(doc.name, (phase, doc));
    }
}

/// Every documented metric, in phase order
pub fn all_documentation() -> Vec<MetricDoc> {
    let mut docs = super::ConsolidateMetrics::metrics_documentation();
    docs.extend(super::NormalizeMetrics::metrics_documentation());
    docs.extend(super::MatchMetrics::metrics_documentation());
    docs.extend(super::ApiMetrics::metrics_documentation());
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let docs = all_documentation();
        let names: HashSet<_> = docs.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), docs.len());
        assert!(docs.iter().all(|d| d.name.starts_with("catalog_")));
    }
}
