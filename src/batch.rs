//! Batch planning: split inventory into lookup-sized groups.

use serde::Serialize;

use crate::model::LocalRecord;

/// A bounded, ordered group of inventory rows sent in one lookup call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    /// Position in the plan. Dispatch order follows this index.
    pub index: usize,
    pub records: Vec<LocalRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Partition `records` into consecutive batches of at most `limit` rows.
///
/// The input is left untouched. Every record lands in exactly one batch,
/// in order; only the last batch may be short. A `limit` of zero is
/// treated as one.
pub fn plan(records: &[LocalRecord], limit: usize) -> Vec<Batch> {
    records
        .chunks(limit.max(1))
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            records: chunk.to_vec(),
        })
        .collect()
}
