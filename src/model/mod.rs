//! Core data model.
//!
//! Inventory rows come in as [`LocalRecord`]s, the card database answers
//! with [`CanonicalRecord`]s, and the two merge into [`ReconciledRecord`]s
//! collected in a run-scoped [`ReconciledCatalog`].

pub mod canonical;
pub mod labels;
pub mod local;
pub mod reconciled;
pub mod run;

pub use canonical::{CanonicalRecord, Money};
pub use local::LocalRecord;
pub use reconciled::{ReconciledCatalog, ReconciledRecord};
pub use run::{BatchFailure, Progress, RunContext, RunId, RunPhase, RunState};
