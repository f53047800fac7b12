//! Authoritative card metadata returned by the lookup service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A currency-qualified amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount,
            currency: "USD".to_string(),
        }
    }
}

/// One card as the card database knows it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub name: String,
    pub set_code: String,
    pub set_name: String,
    pub collector_number: String,
    pub rarity: String,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub mana_cost: Option<String>,
    pub mana_value: Option<f64>,
    /// Single-letter color codes (`W`, `U`, `B`, `R`, `G`).
    pub colors: Vec<String>,
    pub color_identity: Vec<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub artist: Option<String>,
    pub keywords: Vec<String>,
    /// Finishes the printing exists in (`foil`, `nonfoil`, `etched`).
    pub finishes: Vec<String>,
    pub price: Option<Money>,
    pub foil_price: Option<Money>,
    pub image_url: Option<String>,
}

impl CanonicalRecord {
    pub fn new(
        name: impl Into<String>,
        set_code: impl Into<String>,
        collector_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            set_code: set_code.into(),
            collector_number: collector_number.into(),
            ..Self::default()
        }
    }

    /// Whether the type line names the Creature card type.
    pub fn is_creature(&self) -> bool {
        self.type_line
            .as_deref()
            .is_some_and(|t| t.split_whitespace().any(|w| w == "Creature"))
    }
}
