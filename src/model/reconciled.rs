//! Canonical card data merged with the inventory row it came from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::canonical::CanonicalRecord;
use super::labels::{DEFAULT_CONDITION, DEFAULT_LANGUAGE, condition_label, language_label};
use super::local::LocalRecord;

/// The unit stored in a run's output catalog.
///
/// Card facts come from the canonical record; stock facts (quantity,
/// condition, language, purchase price) come from the matched inventory
/// row, or defaults when nothing in the batch matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    pub card: CanonicalRecord,
    pub quantity: u32,
    pub condition: String,
    pub language: String,
    /// Foil flag from the matched inventory row. `None` when unmatched.
    pub local_foil: Option<bool>,
    pub purchase_price: Decimal,
    pub purchase_price_currency: String,
}

impl ReconciledRecord {
    pub fn matched(card: CanonicalRecord, local: &LocalRecord) -> Self {
        Self {
            card,
            quantity: local.quantity.max(1),
            condition: condition_label(&local.condition),
            language: language_label(&local.language),
            local_foil: Some(local.foil),
            purchase_price: local.purchase_price,
            purchase_price_currency: local.purchase_price_currency.clone(),
        }
    }

    pub fn unmatched(card: CanonicalRecord) -> Self {
        Self {
            card,
            quantity: 1,
            condition: DEFAULT_CONDITION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            local_foil: None,
            purchase_price: Decimal::ZERO,
            purchase_price_currency: String::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.local_foil.is_some()
    }

    /// Final finish of the listed copy.
    ///
    /// The inventory flag wins when present. Otherwise the printing is
    /// foil when any foil finish is listed, and non-foil when only
    /// `nonfoil` is listed or nothing is known. Prices never decide.
    pub fn foil(&self) -> bool {
        match self.local_foil {
            Some(foil) => foil,
            None => self
                .card
                .finishes
                .iter()
                .any(|f| f == "foil" || f == "etched"),
        }
    }
}

/// Append-only collection of everything reconciled during one run.
///
/// Records sit in the order their batches completed, not input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciledCatalog {
    records: Vec<ReconciledRecord>,
}

impl ReconciledCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ReconciledRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReconciledRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ReconciledRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ReconciledCatalog {
    type Item = &'a ReconciledRecord;
    type IntoIter = std::slice::Iter<'a, ReconciledRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
