//! Batch reconciliation: dispatch every batch, retry throttled ones once,
//! merge answers into the run catalog, and complete the run exactly once.
//!
//! All batches are driven as futures on the calling task. Their lookups
//! overlap, but settling a resolved batch (merge, count, check for last)
//! runs between polls with no await inside, so no two batches can both
//! observe themselves as the last one.

use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use opentelemetry::KeyValue;
use tracing::{Instrument, error, info, warn};

use super::merge::merge_batch;
use crate::batch::Batch;
use crate::config::Config;
use crate::error::Result;
use crate::event::{Emitter, EventKind};
use crate::lookup::{LookupError, LookupKey, LookupResponse, LookupService};
use crate::model::{Progress, RunContext, RunId};
use crate::telemetry::metrics;
use crate::telemetry::run::{
    record_batch_transition, record_run_totals, start_batch_span, start_run_span,
};

/// Rate-limit policy knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between consecutive batch dispatches.
    pub dispatch_stagger: Duration,
    /// Wait before the single retry of a throttled batch.
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dispatch_stagger: Duration::from_millis(200),
            retry_backoff: Duration::from_millis(2000),
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            dispatch_stagger: config.dispatch_stagger(),
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// A batch together with its final lookup outcome.
struct Resolution<'b> {
    batch: &'b Batch,
    outcome: std::result::Result<LookupResponse, LookupError>,
}

/// Drives one run's batches through the lookup service.
pub struct Reconciler<'a> {
    lookup: &'a dyn LookupService,
    config: EngineConfig,
    events: &'a Emitter<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(lookup: &'a dyn LookupService, config: EngineConfig, events: &'a Emitter<'a>) -> Self {
        Self {
            lookup,
            config,
            events,
        }
    }

    /// Resolve every batch, then hand the finished run to `on_complete`.
    ///
    /// Batch failures are recorded in the run state and never abort the
    /// run. `on_complete` runs once, after the last batch is counted.
    pub async fn run<F>(&self, batches: &[Batch], on_complete: F) -> Result<RunContext>
    where
        F: FnOnce(&RunContext),
    {
        let mut ctx = RunContext::new(batches.len());
        let span = start_run_span(ctx.id, batches.len());

        async {
            let started = Instant::now();
            let total_records: usize = batches.iter().map(Batch::len).sum();
            info!(
                run_id = %ctx.id,
                total_batches = batches.len(),
                total_records,
                "reconciliation started"
            );
            self.events.info(EventKind::RunStarted {
                run_id: ctx.id,
                total_batches: batches.len(),
                total_records,
            });

            let run_id = ctx.id;
            let mut pending: FuturesUnordered<_> = batches
                .iter()
                .enumerate()
                .map(|(slot, batch)| self.resolve(run_id, slot, batch))
                .collect();

            while let Some(resolution) = pending.next().await {
                if let Progress::Pending { completed, total } = self.settle(&mut ctx, resolution)? {
                    info!(completed, total, "batch counted");
                }
            }

            ctx.complete()?;

            let duration_ms = started.elapsed().as_millis() as u64;
            let failed_batches = ctx.state.failures.len();
            record_run_totals(&span, ctx.catalog.len(), failed_batches);
            info!(
                run_id = %ctx.id,
                reconciled = ctx.catalog.len(),
                failed_batches,
                not_found = ctx.state.not_found,
                duration_ms,
                "reconciliation completed"
            );
            self.events.success(EventKind::RunCompleted {
                run_id: ctx.id,
                reconciled: ctx.catalog.len(),
                failed_batches,
                duration_ms,
            });

            on_complete(&ctx);
            Ok(ctx)
        }
        .instrument(span.clone())
        .await
    }

    /// Dispatch one batch after its stagger slot, retrying once if throttled.
    ///
    /// `slot` is the batch's position in this run's dispatch order.
    async fn resolve<'b>(&self, run_id: RunId, slot: usize, batch: &'b Batch) -> Resolution<'b> {
        let span = start_batch_span(run_id, batch.index, batch.len());

        async {
            let slot = u32::try_from(slot).unwrap_or(u32::MAX);
            let delay = self.config.dispatch_stagger.saturating_mul(slot);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            record_batch_transition(&span, "planned", "dispatched");
            metrics::batches_dispatched().add(1, &[]);
            self.events.info(EventKind::BatchDispatched {
                batch_index: batch.index,
                size: batch.len(),
            });

            let keys: Vec<LookupKey> = batch.records.iter().map(LookupKey::from_record).collect();
            let outcome = match self.timed_lookup(&keys).await {
                Err(e) if e.is_rate_limited() => {
                    let backoff_ms = self.config.retry_backoff.as_millis() as u64;
                    warn!(batch_index = batch.index, backoff_ms, "rate limited, retrying once");
                    record_batch_transition(&span, "dispatched", "retrying");
                    metrics::lookup_retries().add(1, &[]);
                    self.events.warning(EventKind::BatchRetrying {
                        batch_index: batch.index,
                        backoff_ms,
                    });
                    tokio::time::sleep(self.config.retry_backoff).await;
                    self.timed_lookup(&keys).await
                }
                other => other,
            };

            let to = if outcome.is_ok() { "resolved" } else { "failed" };
            record_batch_transition(&span, "dispatched", to);
            Resolution { batch, outcome }
        }
        .instrument(span.clone())
        .await
    }

    async fn timed_lookup(&self, keys: &[LookupKey]) -> std::result::Result<LookupResponse, LookupError> {
        let start = Instant::now();
        let outcome = self.lookup.lookup(keys).await;
        let result = match &outcome {
            Ok(_) => "ok",
            Err(e) if e.is_rate_limited() => "rate_limited",
            Err(_) => "error",
        };
        metrics::lookup_duration_ms().record(
            start.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("result", result)],
        );
        outcome
    }

    /// Fold one resolved batch into the run and count it.
    fn settle(&self, ctx: &mut RunContext, resolution: Resolution<'_>) -> Result<Progress> {
        let Resolution { batch, outcome } = resolution;

        match outcome {
            Ok(response) => {
                let not_found = response.not_found;
                let stats = merge_batch(&batch.records, response.cards, &mut ctx.catalog);
                ctx.state.not_found += not_found;
                metrics::batch_outcomes().add(1, &[KeyValue::new("result", "ok")]);
                info!(
                    batch_index = batch.index,
                    matched = stats.matched,
                    unmatched = stats.unmatched,
                    not_found,
                    "batch merged"
                );
                self.events.success(EventKind::BatchCompleted {
                    batch_index: batch.index,
                    resolved: stats.total(),
                    not_found,
                });
            }
            Err(e) => {
                let reason = e.to_string();
                metrics::batch_outcomes().add(1, &[KeyValue::new("result", "failed")]);
                error!(batch_index = batch.index, %reason, "batch failed");
                ctx.state.record_failure(batch.index, reason.clone());
                self.events.error(EventKind::BatchFailed {
                    batch_index: batch.index,
                    reason,
                });
            }
        }

        ctx.state.record_completion()
    }
}
