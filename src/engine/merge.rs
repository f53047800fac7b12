//! Merging canonical cards back onto the inventory rows of their batch.

use tracing::debug;

use crate::model::{CanonicalRecord, LocalRecord, ReconciledCatalog, ReconciledRecord};

/// How a batch's cards landed in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub matched: usize,
    pub unmatched: usize,
}

impl MergeStats {
    pub fn total(&self) -> usize {
        self.matched + self.unmatched
    }
}

/// Set codes arrive upper-case from the scanner and lower-case from the
/// card database; names are compared exactly.
fn same_set(local: &str, canonical: &str) -> bool {
    local.trim().eq_ignore_ascii_case(canonical.trim())
}

/// First inventory row in batch order with the card's name and set.
pub fn find_match<'a>(card: &CanonicalRecord, batch: &'a [LocalRecord]) -> Option<&'a LocalRecord> {
    batch
        .iter()
        .find(|local| local.name == card.name && same_set(&local.set_code, &card.set_code))
}

/// Append one reconciled record per returned card.
///
/// The service's answer drives the result: cards without a matching row
/// are kept with default stock facts, rows without a card add nothing.
pub fn merge_batch(
    batch: &[LocalRecord],
    cards: Vec<CanonicalRecord>,
    catalog: &mut ReconciledCatalog,
) -> MergeStats {
    let mut stats = MergeStats::default();
    for card in cards {
        let record = match find_match(&card, batch) {
            Some(local) => {
                stats.matched += 1;
                ReconciledRecord::matched(card, local)
            }
            None => {
                debug!(name = %card.name, set = %card.set_code, "no inventory row for card, using defaults");
                stats.unmatched += 1;
                ReconciledRecord::unmatched(card)
            }
        };
        catalog.push(record);
    }
    stats
}
