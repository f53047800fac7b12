//! Reconciliation engine: batch dispatch, retry, merge, completion.

pub mod merge;
pub mod reconcile;

pub use merge::{MergeStats, find_match, merge_batch};
pub use reconcile::{EngineConfig, Reconciler};
