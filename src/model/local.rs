//! Inventory rows as exported by the card-scanning app.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the scanner export, prior to enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Card name. Never empty.
    pub name: String,
    pub set_code: String,
    pub set_name: String,
    pub collector_number: String,
    pub foil: bool,
    pub rarity: String,
    /// Copies held. At least 1.
    pub quantity: u32,
    /// Opaque identifier assigned by the scanner app.
    pub source_id: String,
    /// Card-database id the scanner resolved, if any.
    pub external_id: Option<String>,
    pub purchase_price: Decimal,
    pub purchase_price_currency: String,
    pub misprint: bool,
    pub altered: bool,
    pub condition: String,
    pub language: String,
}

impl LocalRecord {
    /// Convenience constructor with scanner defaults for every optional column.
    pub fn new(name: impl Into<String>, set_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_code: set_code.into(),
            set_name: String::new(),
            collector_number: String::new(),
            foil: false,
            rarity: String::new(),
            quantity: 1,
            source_id: String::new(),
            external_id: None,
            purchase_price: Decimal::ZERO,
            purchase_price_currency: String::new(),
            misprint: false,
            altered: false,
            condition: String::new(),
            language: String::new(),
        }
    }

    pub fn collector_number(mut self, number: impl Into<String>) -> Self {
        self.collector_number = number.into();
        self
    }

    pub fn foil(mut self, foil: bool) -> Self {
        self.foil = foil;
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
