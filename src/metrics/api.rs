//! Catalog API Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the read-only HTTP API
pub struct ApiMetrics;

impl ApiMetrics {
    pub fn record_request(route: &'static str, status: u16) {
        ::metrics::counter!(
            phase_metric!(counter, "api", "requests"),
            "route" => route,
            "status" => status.to_string()
        )
        .increment(1);
    }

    pub fn record_catalog_loaded(items: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "api", "catalog_items")).set(items as f64);
    }
}

impl PhaseMetrics for ApiMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "api", "requests"));
        let _ = gauge!(phase_metric!(gauge, "api", "catalog_items"));
    }

    fn phase_name() -> &'static str {
        "api"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "api", "requests"),
                metric_type: MetricType::Counter,
                help: "HTTP requests served",
                labels: vec!["route", "status"],
            },
            MetricDoc {
                name: phase_metric!(gauge, "api", "catalog_items"),
                metric_type: MetricType::Gauge,
                help: "Products in the catalog loaded at startup",
                labels: vec![],
            },
        ]
    }
}
