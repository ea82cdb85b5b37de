//! Normalization Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the normalization phase
pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_run(rows_in: usize, rows_out: usize, without_quantity: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "normalize", "rows_normalized")).increment(rows_out as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "rows_dropped"))
            .increment(rows_in.saturating_sub(rows_out) as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "rows_without_quantity"))
            .increment(without_quantity as u64);
        ::metrics::histogram!(phase_metric!(histogram, "normalize", "duration_seconds")).record(duration_secs);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "normalize", "runs"));
        let _ = counter!(phase_metric!(counter, "normalize", "rows_normalized"));
        let _ = counter!(phase_metric!(counter, "normalize", "rows_dropped"));
        let _ = counter!(phase_metric!(counter, "normalize", "rows_without_quantity"));
        let _ = histogram!(phase_metric!(histogram, "normalize", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed normalization runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "rows_normalized"),
                metric_type: MetricType::Counter,
                help: "Rows written to the normalized table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "rows_dropped"),
                metric_type: MetricType::Counter,
                help: "Rows dropped because their name or store could not be recovered",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "rows_without_quantity"),
                metric_type: MetricType::Counter,
                help: "Rows whose quantity text held no number",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "normalize", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a normalization run",
                labels: vec![],
            },
        ]
    }
}
