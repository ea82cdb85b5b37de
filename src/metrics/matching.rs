//! Identity Resolution Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the match phase
pub struct MatchMetrics;

impl MatchMetrics {
    pub fn record_run(rows: usize, groups: usize, split_groups: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "match", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "match", "rows_matched")).increment(rows as u64);
        ::metrics::counter!(phase_metric!(counter, "match", "split_groups")).increment(split_groups as u64);
        ::metrics::gauge!(phase_metric!(gauge, "match", "product_groups")).set(groups as f64);
        ::metrics::histogram!(phase_metric!(histogram, "match", "duration_seconds")).record(duration_secs);
    }

    pub fn record_inconsistency() {
        ::metrics::counter!(phase_metric!(counter, "match", "inconsistent_runs")).increment(1);
    }
}

impl PhaseMetrics for MatchMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "match", "runs"));
        let _ = counter!(phase_metric!(counter, "match", "rows_matched"));
        let _ = counter!(phase_metric!(counter, "match", "split_groups"));
        let _ = counter!(phase_metric!(counter, "match", "inconsistent_runs"));
        let _ = gauge!(phase_metric!(gauge, "match", "product_groups"));
        let _ = histogram!(phase_metric!(histogram, "match", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "match"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "match", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed identity resolution runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "match", "rows_matched"),
                metric_type: MetricType::Counter,
                help: "Rows written to the matched table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "match", "split_groups"),
                metric_type: MetricType::Counter,
                help: "Signature groups given a fresh id because their provisional id was taken",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "match", "inconsistent_runs"),
                metric_type: MetricType::Counter,
                help: "Runs where distinct ids and distinct signatures disagreed",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "match", "product_groups"),
                metric_type: MetricType::Gauge,
                help: "Distinct products in the last matched table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "match", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of an identity resolution run",
                labels: vec![],
            },
        ]
    }
}
