//! Consolidation Phase Metrics
//!
//! Per-store read outcomes and the size of the merged table.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the consolidation phase
pub struct ConsolidateMetrics;

impl ConsolidateMetrics {
    /// A store export was read and its rows merged
    pub fn record_store_read(store: &str, rows_kept: usize, rows_dropped: usize) {
        let store = store.to_string();
        ::metrics::counter!(phase_metric!(counter, "consolidate", "stores_read"), "store" => store.clone())
            .increment(1);
        ::metrics::counter!(phase_metric!(counter, "consolidate", "rows_kept"), "store" => store.clone())
            .increment(rows_kept as u64);
        ::metrics::counter!(phase_metric!(counter, "consolidate", "rows_dropped"), "store" => store)
            .increment(rows_dropped as u64);
    }

    /// A store was skipped entirely
    pub fn record_store_skipped(store: &str, reason: &'static str) {
        ::metrics::counter!(
            phase_metric!(counter, "consolidate", "stores_skipped"),
            "store" => store.to_string(),
            "reason" => reason
        )
        .increment(1);
    }

    pub fn record_run(rows_written: usize, duplicates_removed: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "consolidate", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "consolidate", "duplicates_removed"))
            .increment(duplicates_removed as u64);
        ::metrics::gauge!(phase_metric!(gauge, "consolidate", "rows_written")).set(rows_written as f64);
        ::metrics::histogram!(phase_metric!(histogram, "consolidate", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for ConsolidateMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "consolidate", "runs"));
        let _ = counter!(phase_metric!(counter, "consolidate", "stores_read"));
        let _ = counter!(phase_metric!(counter, "consolidate", "stores_skipped"));
        let _ = counter!(phase_metric!(counter, "consolidate", "rows_kept"));
        let _ = counter!(phase_metric!(counter, "consolidate", "rows_dropped"));
        let _ = counter!(phase_metric!(counter, "consolidate", "duplicates_removed"));
        let _ = gauge!(phase_metric!(gauge, "consolidate", "rows_written"));
        let _ = histogram!(phase_metric!(histogram, "consolidate", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "consolidate"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed consolidation runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "stores_read"),
                metric_type: MetricType::Counter,
                help: "Store exports read successfully",
                labels: vec!["store"],
            },
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "stores_skipped"),
                metric_type: MetricType::Counter,
                help: "Store exports skipped because they were missing or unreadable",
                labels: vec!["store", "reason"],
            },
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "rows_kept"),
                metric_type: MetricType::Counter,
                help: "Rows accepted into the consolidated table",
                labels: vec!["store"],
            },
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "rows_dropped"),
                metric_type: MetricType::Counter,
                help: "Rows dropped for missing names, bad prices or short rows",
                labels: vec!["store"],
            },
            MetricDoc {
                name: phase_metric!(counter, "consolidate", "duplicates_removed"),
                metric_type: MetricType::Counter,
                help: "Exact duplicate rows removed after merging",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "consolidate", "rows_written"),
                metric_type: MetricType::Gauge,
                help: "Rows in the last consolidated table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "consolidate", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a consolidation run",
                labels: vec![],
            },
        ]
    }
}
