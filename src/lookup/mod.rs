//! Card lookup: the seam between the reconciliation engine and the card
//! database.
//!
//! The engine only sees [`LookupService`]; [`scryfall::ScryfallClient`] is
//! the HTTP implementation, tests substitute scripted fakes.

pub mod scryfall;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::model::{CanonicalRecord, LocalRecord};

/// Identity of one card to look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LookupKey {
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
}

impl LookupKey {
    pub fn from_record(record: &LocalRecord) -> Self {
        let non_empty = |s: &str| Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            name: record.name.clone(),
            set_code: non_empty(&record.set_code),
            collector_number: non_empty(&record.collector_number),
        }
    }
}

/// What the service answered for one batch of keys.
#[derive(Debug, Clone, Default)]
pub struct LookupResponse {
    /// Resolved cards, in the order the service returned them.
    pub cards: Vec<CanonicalRecord>,
    /// Number of keys the service could not resolve.
    pub not_found: usize,
}

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("rate limited by lookup service")]
    RateLimited,

    #[error("lookup service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LookupError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LookupError::RateLimited)
    }
}

/// A source of canonical card records.
///
/// One call resolves one batch. Implementations report throttling as
/// [`LookupError::RateLimited`] so callers can apply their retry policy.
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn lookup(&self, keys: &[LookupKey]) -> Result<LookupResponse, LookupError>;
}
