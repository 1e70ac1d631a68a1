//! Metrics collection with Prometheus
//!
//! Store-level metrics for duostore:
//! - Operation counts and failures by store and operation
//! - Operation latency histograms
//! - Role availability decided at startup

use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for duostore
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Store operations issued
    pub store_operations_total: CounterVec,
    /// Store operations that returned an error
    pub store_failures_total: CounterVec,
    /// Store operation duration
    pub store_operation_duration_seconds: HistogramVec,
    /// Role availability (1=active, 0=unavailable)
    pub store_available: GaugeVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let store_operations_total = CounterVec::new(
            Opts::new(
                "duostore_store_operations_total",
                "Total number of store operations",
            ),
            &["store", "operation"],
        )?;

        let store_failures_total = CounterVec::new(
            Opts::new(
                "duostore_store_failures_total",
                "Total number of failed store operations",
            ),
            &["store", "operation"],
        )?;

        let store_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "duostore_store_operation_duration_seconds",
                "Store operation duration in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
            ]),
            &["store", "operation"],
        )?;

        let store_available = GaugeVec::new(
            Opts::new(
                "duostore_store_available",
                "Store role availability (1=active, 0=unavailable)",
            ),
            &["role"],
        )?;

        registry.register(Box::new(store_operations_total.clone()))?;
        registry.register(Box::new(store_failures_total.clone()))?;
        registry.register(Box::new(store_operation_duration_seconds.clone()))?;
        registry.register(Box::new(store_available.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            store_operations_total,
            store_failures_total,
            store_operation_duration_seconds,
            store_available,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a completed store operation
    pub fn record_operation(&self, store: &str, operation: &str, success: bool, duration_secs: f64) {
        self.store_operations_total
            .with_label_values(&[store, operation])
            .inc();
        if !success {
            self.store_failures_total
                .with_label_values(&[store, operation])
                .inc();
        }
        self.store_operation_duration_seconds
            .with_label_values(&[store, operation])
            .observe(duration_secs);
    }

    /// Publish whether a role resolved to a live store
    pub fn set_store_available(&self, role: &str, available: bool) {
        self.store_available
            .with_label_values(&[role])
            .set(if available { 1.0 } else { 0.0 });
    }
}
