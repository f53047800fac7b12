//! Run and batch span helpers.
//!
//! Provides span creation and transition recording for batches flowing
//! through the reconciliation engine.

use tracing::Span;

use crate::model::RunId;

/// Start a span covering one reconciliation run.
pub fn start_run_span(run_id: RunId, total_batches: usize) -> Span {
    tracing::info_span!(
        "run.reconcile",
        "run.id" = %run_id,
        "run.total_batches" = total_batches,
        "run.reconciled" = tracing::field::Empty,
        "run.failed_batches" = tracing::field::Empty,
    )
}

/// Start a span for one batch lookup.
///
/// The `batch.state` field is declared empty and can be updated via
/// [`record_batch_transition`].
pub fn start_batch_span(run_id: RunId, batch_index: usize, size: usize) -> Span {
    tracing::info_span!(
        "batch.lookup",
        "run.id" = %run_id,
        "batch.index" = batch_index,
        "batch.size" = size,
        "batch.state" = tracing::field::Empty,
    )
}

/// Record a batch state transition on the given span.
pub fn record_batch_transition(span: &Span, from: &str, to: &str) {
    span.record("batch.state", to);
    span.in_scope(|| {
        tracing::debug!(from = from, to = to, "batch_transition");
    });
}

/// Fill in the run totals once every batch has resolved.
pub fn record_run_totals(span: &Span, reconciled: usize, failed_batches: usize) {
    span.record("run.reconciled", reconciled);
    span.record("run.failed_batches", failed_batches);
}
