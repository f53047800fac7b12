//! Integration tests for telemetry initialization and span helpers.

use cardcat::model::RunId;
use cardcat::telemetry::{self, TelemetryConfig, metrics, run};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be installed once per process, so an
    // Err here just means another test got there first.
    let config = TelemetryConfig {
        endpoint: None,
        service_name: "cardcat-test".to_string(),
        default_filter: "debug".to_string(),
    };
    let _guard = telemetry::init_telemetry(config);
}

#[test]
fn guard_without_exporters_flushes_and_drops() {
    let guard = telemetry::TelemetryGuard::default();
    guard.force_flush();
    drop(guard);
}

#[test]
fn run_span_records_totals() {
    let span = run::start_run_span(RunId::new(), 3);
    run::record_run_totals(&span, 120, 1);
}

#[test]
fn batch_span_creates_and_records_transition() {
    let span = run::start_batch_span(RunId::new(), 0, 75);
    run::record_batch_transition(&span, "planned", "dispatched");
    run::record_batch_transition(&span, "dispatched", "resolved");
}

#[test]
fn instruments_accept_recordings_without_a_provider() {
    metrics::batches_dispatched().add(1, &[]);
    metrics::lookup_duration_ms().record(12.5, &[]);
    metrics::catalog_rows_written().add(3, &[]);
}
