//! Metric instrument factories for cardcat.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"cardcat"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for cardcat instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("cardcat")
}

/// Counter: lookup batches dispatched.
pub fn batches_dispatched() -> Counter<u64> {
    meter()
        .u64_counter("cardcat.batch.dispatched")
        .with_description("Number of lookup batches dispatched")
        .build()
}

/// Counter: resolved batches.
/// Labels: `result` ("ok" | "failed").
pub fn batch_outcomes() -> Counter<u64> {
    meter()
        .u64_counter("cardcat.batch.outcomes")
        .with_description("Number of lookup batches resolved, by result")
        .build()
}

/// Counter: lookup calls retried after a rate-limit rejection.
pub fn lookup_retries() -> Counter<u64> {
    meter()
        .u64_counter("cardcat.lookup.retries")
        .with_description("Number of lookup calls retried after throttling")
        .build()
}

/// Histogram: single lookup call duration in milliseconds.
/// Labels: `result` ("ok" | "rate_limited" | "error").
pub fn lookup_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("cardcat.lookup.duration_ms")
        .with_description("Lookup call duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Counter: inventory lines dropped by the parser.
pub fn input_rows_skipped() -> Counter<u64> {
    meter()
        .u64_counter("cardcat.input.rows_skipped")
        .with_description("Inventory lines dropped while parsing")
        .build()
}

/// Counter: catalog rows written.
pub fn catalog_rows_written() -> Counter<u64> {
    meter()
        .u64_counter("cardcat.catalog.rows_written")
        .with_description("Number of catalog rows serialized")
        .build()
}
