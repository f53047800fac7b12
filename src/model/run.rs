//! Run-scoped state: batch accounting, failures, and the output catalog.
//!
//! A run owns everything it accumulates. Nothing survives past the run
//! context handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reconciled::ReconciledCatalog;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Run identity
// ---------------------------------------------------------------------------

/// Newtype for run IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Batches are still resolving.
    InProgress,
    /// Every batch resolved and the completion handler has run. Terminal.
    Complete,
}

impl RunPhase {
    pub fn can_transition_to(self, to: RunPhase) -> bool {
        matches!((self, to), (RunPhase::InProgress, RunPhase::Complete))
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunPhase::InProgress => "in_progress",
            RunPhase::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Batch accounting
// ---------------------------------------------------------------------------

/// A batch that resolved without contributing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub reason: String,
}

/// What counting one more resolved batch meant for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending { completed: usize, total: usize },
    AllResolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub total_batches: usize,
    pub completed_batches: usize,
    pub failures: Vec<BatchFailure>,
    /// Lookup keys the service could not resolve, summed over batches.
    pub not_found: usize,
    phase: RunPhase,
}

impl RunState {
    pub fn new(total_batches: usize) -> Self {
        Self {
            total_batches,
            completed_batches: 0,
            failures: Vec::new(),
            not_found: 0,
            phase: RunPhase::InProgress,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_resolved(&self) -> bool {
        self.completed_batches == self.total_batches
    }

    /// Count one batch as resolved, success or failure.
    ///
    /// Counting past the total is rejected, so no batch can be the
    /// "last one" twice.
    pub fn record_completion(&mut self) -> Result<Progress> {
        if self.phase != RunPhase::InProgress || self.is_resolved() {
            return Err(Error::InvalidTransition {
                from: format!(
                    "{} ({}/{})",
                    self.phase, self.completed_batches, self.total_batches
                ),
                to: "batch completed".to_string(),
            });
        }
        self.completed_batches += 1;
        if self.is_resolved() {
            Ok(Progress::AllResolved)
        } else {
            Ok(Progress::Pending {
                completed: self.completed_batches,
                total: self.total_batches,
            })
        }
    }

    pub fn record_failure(&mut self, batch_index: usize, reason: impl Into<String>) {
        self.failures.push(BatchFailure {
            batch_index,
            reason: reason.into(),
        });
    }

    /// Move the run into its terminal phase.
    ///
    /// Fails if batches are outstanding or the run already completed.
    pub fn complete(&mut self) -> Result<()> {
        let to = RunPhase::Complete;
        if !self.phase.can_transition_to(to) || !self.is_resolved() {
            return Err(Error::InvalidTransition {
                from: format!(
                    "{} ({}/{})",
                    self.phase, self.completed_batches, self.total_batches
                ),
                to: to.to_string(),
            });
        }
        self.phase = to;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Caller-owned state of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub id: RunId,
    pub state: RunState,
    pub catalog: ReconciledCatalog,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunContext {
    pub fn new(total_batches: usize) -> Self {
        Self {
            id: RunId::new(),
            state: RunState::new(total_batches),
            catalog: ReconciledCatalog::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self) -> Result<()> {
        self.state.complete()?;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
