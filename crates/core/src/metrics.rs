//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Algorithm store queries (counts, latency, failures)
//! - Random selector refreshes

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Store Metrics
// =============================================================================

/// Store queries total by backend, operation and result.
pub static STORE_QUERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cubealg_store_queries_total", "Total algorithm store queries"),
        &["backend", "operation", "result"], // result: "ok", "error"
    )
    .unwrap()
});

/// Store query duration in seconds.
pub static STORE_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cubealg_store_query_duration_seconds",
            "Duration of algorithm store queries",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["backend", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Selector Metrics
// =============================================================================

/// Random selector refreshes by family.
pub static SELECTOR_REFRESHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cubealg_selector_refreshes_total",
            "Times a daily random pick was redrawn",
        ),
        &["family"],
    )
    .unwrap()
});

/// Record one finished store query.
pub fn record_store_query(backend: &str, operation: &str, started: Instant, ok: bool) {
    STORE_QUERY_DURATION
        .with_label_values(&[backend, operation])
        .observe(started.elapsed().as_secs_f64());
    STORE_QUERIES_TOTAL
        .with_label_values(&[backend, operation, if ok { "ok" } else { "error" }])
        .inc();
}

/// All core metrics, for registration by the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(STORE_QUERIES_TOTAL.clone()),
        Box::new(STORE_QUERY_DURATION.clone()),
        Box::new(SELECTOR_REFRESHES_TOTAL.clone()),
    ]
}
