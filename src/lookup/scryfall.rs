//! HTTP client for the card database's collection endpoint.
//!
//! `POST {base}/cards/collection` with up to 75 identifiers, answered by
//! `{"data": [...], "not_found": [...]}`.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LookupError, LookupKey, LookupResponse, LookupService};
use crate::config::Config;
use crate::error::Result;
use crate::model::{CanonicalRecord, Money};

/// Collection-endpoint client.
pub struct ScryfallClient {
    client: Client,
    base_url: String,
}

impl ScryfallClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/cards/collection", self.base_url)
    }
}

#[async_trait]
impl LookupService for ScryfallClient {
    async fn lookup(&self, keys: &[LookupKey]) -> std::result::Result<LookupResponse, LookupError> {
        let body = CollectionRequest {
            identifiers: keys.iter().map(Identifier::from_key).collect(),
        };

        let response = self
            .client
            .post(self.collection_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }

        let text = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed = parse_collection(&text)?;
        debug!(
            requested = keys.len(),
            resolved = parsed.cards.len(),
            not_found = parsed.not_found,
            "collection lookup answered"
        );
        Ok(parsed)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CollectionRequest {
    identifiers: Vec<Identifier>,
}

/// One entry of the `identifiers` array.
///
/// The endpoint accepts only certain field combinations, so the most
/// specific one the key supports is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    SetNumber { set: String, collector_number: String },
    NameSet { name: String, set: String },
    Name { name: String },
}

impl Identifier {
    pub fn from_key(key: &LookupKey) -> Self {
        match (&key.set_code, &key.collector_number) {
            (Some(set), Some(number)) => Identifier::SetNumber {
                set: set.to_ascii_lowercase(),
                collector_number: number.clone(),
            },
            (Some(set), None) => Identifier::NameSet {
                name: key.name.clone(),
                set: set.to_ascii_lowercase(),
            },
            (None, _) => Identifier::Name {
                name: key.name.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    data: Vec<Card>,
    #[serde(default)]
    not_found: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Card {
    name: String,
    #[serde(default)]
    set: String,
    #[serde(default)]
    set_name: String,
    #[serde(default)]
    collector_number: String,
    #[serde(default)]
    rarity: String,
    type_line: Option<String>,
    oracle_text: Option<String>,
    mana_cost: Option<String>,
    cmc: Option<f64>,
    colors: Option<Vec<String>>,
    #[serde(default)]
    color_identity: Vec<String>,
    power: Option<String>,
    toughness: Option<String>,
    artist: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    finishes: Vec<String>,
    #[serde(default)]
    prices: Prices,
    image_uris: Option<ImageUris>,
    #[serde(default)]
    card_faces: Vec<CardFace>,
}

#[derive(Debug, Default, Deserialize)]
struct Prices {
    usd: Option<String>,
    usd_foil: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageUris {
    normal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardFace {
    type_line: Option<String>,
    oracle_text: Option<String>,
    mana_cost: Option<String>,
    colors: Option<Vec<String>>,
    power: Option<String>,
    toughness: Option<String>,
    image_uris: Option<ImageUris>,
}

/// Decode a collection-endpoint body.
///
/// A body that is not JSON, or has no `data` array, is malformed.
pub fn parse_collection(body: &str) -> std::result::Result<LookupResponse, LookupError> {
    let response: CollectionResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    Ok(LookupResponse {
        cards: response.data.into_iter().map(Card::into_canonical).collect(),
        not_found: response.not_found.len(),
    })
}

impl Card {
    fn into_canonical(self) -> CanonicalRecord {
        let faces = &self.card_faces;
        let front = faces.first();

        let image_url = self
            .image_uris
            .and_then(|i| i.normal)
            .or_else(|| front.and_then(|f| f.image_uris.as_ref()).and_then(|i| i.normal.clone()));
        let oracle_text = self
            .oracle_text
            .or_else(|| join_faces(faces, |f| f.oracle_text.as_deref()));
        let mana_cost = self
            .mana_cost
            .filter(|m| !m.is_empty())
            .or_else(|| join_faces(faces, |f| f.mana_cost.as_deref()));
        let type_line = self
            .type_line
            .or_else(|| join_faces(faces, |f| f.type_line.as_deref()));
        let colors = self
            .colors
            .or_else(|| front.and_then(|f| f.colors.clone()))
            .unwrap_or_default();
        let power = self.power.or_else(|| front.and_then(|f| f.power.clone()));
        let toughness = self
            .toughness
            .or_else(|| front.and_then(|f| f.toughness.clone()));

        CanonicalRecord {
            name: self.name,
            set_code: self.set,
            set_name: self.set_name,
            collector_number: self.collector_number,
            rarity: self.rarity,
            type_line,
            oracle_text,
            mana_cost,
            mana_value: self.cmc,
            colors,
            color_identity: self.color_identity,
            power,
            toughness,
            artist: self.artist,
            keywords: self.keywords,
            finishes: self.finishes,
            price: usd(self.prices.usd.as_deref()),
            foil_price: usd(self.prices.usd_foil.as_deref()),
            image_url,
        }
    }
}

fn join_faces(faces: &[CardFace], field: impl Fn(&CardFace) -> Option<&str>) -> Option<String> {
    let parts: Vec<&str> = faces
        .iter()
        .filter_map(field)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" // "))
    }
}

fn usd(raw: Option<&str>) -> Option<Money> {
    raw.and_then(|s| Decimal::from_str(s).ok()).map(Money::usd)
}
