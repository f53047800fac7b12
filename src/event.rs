//! Progress events emitted at every run lifecycle transition.
//!
//! Events are the run's voice to whatever shows progress to a person:
//! ordered, timestamped, leveled. The engine only writes to a
//! [`ProgressSink`]; it never reads back.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RunId;

/// A structured progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number within a run. Consumers can detect gaps.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    InputParsed {
        accepted: usize,
        skipped: usize,
    },
    InputRowSkipped {
        line: usize,
        reason: String,
    },
    RunStarted {
        run_id: RunId,
        total_batches: usize,
        total_records: usize,
    },
    BatchDispatched {
        batch_index: usize,
        size: usize,
    },
    BatchRetrying {
        batch_index: usize,
        backoff_ms: u64,
    },
    BatchCompleted {
        batch_index: usize,
        resolved: usize,
        not_found: usize,
    },
    BatchFailed {
        batch_index: usize,
        reason: String,
    },
    RunCompleted {
        run_id: RunId,
        reconciled: usize,
        failed_batches: usize,
        duration_ms: u64,
    },
    RowRejected {
        name: String,
        reason: String,
    },
    CatalogEmpty,
    CatalogWritten {
        rows: usize,
    },
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::InputParsed { accepted, skipped } => {
                write!(f, "parsed {accepted} inventory rows ({skipped} skipped)")
            }
            EventKind::InputRowSkipped { line, reason } => {
                write!(f, "skipped line {line}: {reason}")
            }
            EventKind::RunStarted {
                run_id,
                total_batches,
                total_records,
            } => write!(
                f,
                "run {run_id}: looking up {total_records} cards in {total_batches} batches"
            ),
            EventKind::BatchDispatched { batch_index, size } => {
                write!(f, "batch {} dispatched ({size} cards)", batch_index + 1)
            }
            EventKind::BatchRetrying {
                batch_index,
                backoff_ms,
            } => write!(
                f,
                "batch {} rate limited, retrying in {backoff_ms}ms",
                batch_index + 1
            ),
            EventKind::BatchCompleted {
                batch_index,
                resolved,
                not_found,
            } => write!(
                f,
                "batch {} completed: {resolved} resolved, {not_found} not found",
                batch_index + 1
            ),
            EventKind::BatchFailed {
                batch_index,
                reason,
            } => write!(f, "batch {} failed: {reason}", batch_index + 1),
            EventKind::RunCompleted {
                run_id,
                reconciled,
                failed_batches,
                duration_ms,
            } => write!(
                f,
                "run {run_id} completed in {duration_ms}ms: {reconciled} cards, {failed_batches} failed batches"
            ),
            EventKind::RowRejected { name, reason } => {
                write!(f, "row for '{name}' rejected: {reason}")
            }
            EventKind::CatalogEmpty => write!(f, "catalog is empty, nothing to export"),
            EventKind::CatalogWritten { rows } => write!(f, "catalog ready: {rows} rows"),
        }
    }
}

/// Write-only destination for progress events.
pub trait ProgressSink: Send + Sync {
    fn record(&self, event: Event);
}

/// Stamps events with sequence numbers and timestamps before handing
/// them to a sink.
pub struct Emitter<'a> {
    sink: &'a dyn ProgressSink,
    seq: AtomicU64,
}

impl<'a> Emitter<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            seq: AtomicU64::new(0),
        }
    }

    pub fn emit(&self, level: Level, kind: EventKind) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.sink.record(Event {
            seq,
            timestamp: Utc::now(),
            level,
            kind,
        });
    }

    pub fn info(&self, kind: EventKind) {
        self.emit(Level::Info, kind);
    }

    pub fn success(&self, kind: EventKind) {
        self.emit(Level::Success, kind);
    }

    pub fn warning(&self, kind: EventKind) {
        self.emit(Level::Warning, kind);
    }

    pub fn error(&self, kind: EventKind) {
        self.emit(Level::Error, kind);
    }
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn record(&self, event: Event) {
        let Event {
            seq, level, kind, ..
        } = event;
        match level {
            Level::Info | Level::Success => tracing::info!(seq, %level, "{kind}"),
            Level::Warning => tracing::warn!(seq, "{kind}"),
            Level::Error => tracing::error!(seq, "{kind}"),
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, level: Level) -> usize {
        self.events().iter().filter(|e| e.level == level).count()
    }
}

impl ProgressSink for MemorySink {
    fn record(&self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Sends each event to two sinks.
pub struct Tee<'a>(pub &'a dyn ProgressSink, pub &'a dyn ProgressSink);

impl ProgressSink for Tee<'_> {
    fn record(&self, event: Event) {
        self.0.record(event.clone());
        self.1.record(event);
    }
}
