//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `custody_registrations_total` - Products registered
//! - `custody_transfers_total` - Custody advances recorded
//! - `custody_transactions_total` - All custody events appended
//! - `custody_rejections_total` - Operations rejected with a typed error
//! - `custody_active_products` - Products not yet in the terminal status
//! - `custody_operation_duration_seconds` - Histogram of operation latencies
//!
//! Metrics are registered into an owned [`Registry`], so multiple ledgers
//! in one process do not collide.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Products registered
    pub registrations_total: IntCounter,

    /// Custody advances recorded
    pub transfers_total: IntCounter,

    /// All custody events appended
    pub transactions_total: IntCounter,

    /// Operations rejected with a typed error
    pub rejections_total: IntCounter,

    /// Products not yet in the terminal status
    pub active_products: IntGauge,

    /// Operation latency histogram
    pub operation_duration: Histogram,

    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let registrations_total = IntCounter::with_opts(Opts::new(
            "custody_registrations_total",
            "Products registered",
        ))?;
        registry.register(Box::new(registrations_total.clone()))?;

        let transfers_total = IntCounter::with_opts(Opts::new(
            "custody_transfers_total",
            "Custody advances recorded",
        ))?;
        registry.register(Box::new(transfers_total.clone()))?;

        let transactions_total = IntCounter::with_opts(Opts::new(
            "custody_transactions_total",
            "All custody events appended",
        ))?;
        registry.register(Box::new(transactions_total.clone()))?;

        let rejections_total = IntCounter::with_opts(Opts::new(
            "custody_rejections_total",
            "Operations rejected with a typed error",
        ))?;
        registry.register(Box::new(rejections_total.clone()))?;

        let active_products = IntGauge::with_opts(Opts::new(
            "custody_active_products",
            "Products not yet in the terminal status",
        ))?;
        registry.register(Box::new(active_products.clone()))?;

        let operation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "custody_operation_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![
                0.000001, 0.000005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001,
            ]),
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registrations_total,
            transfers_total,
            transactions_total,
            rejections_total,
            active_products,
            operation_duration,
            registry,
        })
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.registrations_total.get(), 0);
        assert_eq!(metrics.transactions_total.get(), 0);
        assert_eq!(metrics.active_products.get(), 0);
    }

    #[test]
    fn test_counters_record() {
        let metrics = Metrics::new().unwrap();
        metrics.registrations_total.inc();
        metrics.transactions_total.inc();
        metrics.active_products.inc();
        metrics.active_products.dec();

        assert_eq!(metrics.registrations_total.get(), 1);
        assert_eq!(metrics.transactions_total.get(), 1);
        assert_eq!(metrics.active_products.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        // two ledgers in one process must not collide
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.registrations_total.inc();
        assert_eq!(b.registrations_total.get(), 0);
    }

    #[test]
    fn test_registry_gathers_families() {
        let metrics = Metrics::new().unwrap();
        metrics.registrations_total.inc();
        let families = metrics.registry().gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "custody_registrations_total"));
    }
}
