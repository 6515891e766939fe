//! # Metrics
//!
//! Split-query metrics exported through the OpenTelemetry metrics API when the
//! `metrics` feature is enabled. Without it, every recording function below
//! compiles to a no-op.
//!
//! The embedding application owns the meter provider. Call
//! [`init_metric_handles`] once with a [`Meter`] taken from that provider;
//! recordings made before then are dropped.
//!
//! ## Instruments
//!
//! - `queries`: split queries started.
//! - `subqueries`: sub-range executions started.
//! - `subquery_errors`: sub-range executions that returned an error.
//! - `early_exits`: queries that stopped once the result limit was met.
//! - `cancellations`: queries aborted by cancellation or deadline.
//! - `intervals_per_query`: number of sub-ranges per query.
//! - `query_duration`: end-to-end split query duration (ms).

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter};
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(feature = "metrics")]
static QUERIES: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static SUBQUERIES: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static SUBQUERY_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static EARLY_EXITS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CANCELLATIONS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static INTERVALS_PER_QUERY: OnceLock<Histogram<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static QUERY_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
pub fn init_metric_handles(meter: Meter) {
    let _ = QUERIES.set(
        meter
            .u64_counter("queries")
            .with_description("Split queries started")
            .build(),
    );

    let _ = SUBQUERIES.set(
        meter
            .u64_counter("subqueries")
            .with_description("Sub-range executions started")
            .build(),
    );

    let _ = SUBQUERY_ERRORS.set(
        meter
            .u64_counter("subquery_errors")
            .with_description("Sub-range executions that failed")
            .build(),
    );

    let _ = EARLY_EXITS.set(
        meter
            .u64_counter("early_exits")
            .with_description("Queries that stopped once their limit was met")
            .build(),
    );

    let _ = CANCELLATIONS.set(
        meter
            .u64_counter("cancellations")
            .with_description("Queries aborted by cancellation or deadline")
            .build(),
    );

    let _ = INTERVALS_PER_QUERY.set(
        meter
            .u64_histogram("intervals_per_query")
            .with_description("Sub-ranges per split query")
            .build(),
    );

    let _ = QUERY_DURATION_MS.set(
        meter
            .f64_histogram("query_duration")
            .with_unit("ms")
            .with_description("End-to-end split query duration")
            .build(),
    );
}

#[cfg(feature = "metrics")]
pub fn increment_queries() {
    if let Some(counter) = QUERIES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_queries() {}

#[cfg(feature = "metrics")]
pub fn increment_subqueries() {
    if let Some(counter) = SUBQUERIES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_subqueries() {}

#[cfg(feature = "metrics")]
pub fn increment_subquery_errors() {
    if let Some(counter) = SUBQUERY_ERRORS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_subquery_errors() {}

#[cfg(feature = "metrics")]
pub fn increment_early_exits() {
    if let Some(counter) = EARLY_EXITS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_early_exits() {}

#[cfg(feature = "metrics")]
pub fn increment_cancellations() {
    if let Some(counter) = CANCELLATIONS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cancellations() {}

#[cfg(feature = "metrics")]
pub fn record_intervals_per_query(count: u64) {
    if let Some(histogram) = INTERVALS_PER_QUERY.get() {
        histogram.record(count, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_intervals_per_query(_count: u64) {}

#[cfg(feature = "metrics")]
pub fn record_query_duration(duration_ms: f64) {
    if let Some(histogram) = QUERY_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_query_duration(_duration_ms: f64) {}
