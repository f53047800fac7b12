//! Shared test fixtures: a scripted lookup service and export builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cardcat::lookup::{LookupError, LookupKey, LookupResponse, LookupService};
use cardcat::model::{CanonicalRecord, LocalRecord};

pub const HEADER_LINE: &str = "Name,Set code,Set name,Collector number,Foil,Rarity,Quantity,ManaBox ID,Scryfall ID,Purchase price,Misprint,Altered,Condition,Language,Purchase price currency";

/// One scripted answer to a lookup call.
pub enum Step {
    /// Resolve every key to a minimal card with the key's name and set.
    Echo,
    Cards(Vec<CanonicalRecord>),
    Fail(LookupError),
    Delay(Duration, Box<Step>),
}

impl Step {
    pub fn delayed(ms: u64, step: Step) -> Self {
        Step::Delay(Duration::from_millis(ms), Box::new(step))
    }
}

/// Lookup fake. Scripts are keyed by the first card name of a batch;
/// unscripted calls echo.
#[derive(Default)]
pub struct ScriptedLookup {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<Vec<LookupKey>>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, first_name: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(first_name.to_string(), steps.into());
        self
    }

    pub fn calls(&self) -> Vec<Vec<LookupKey>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// First card name of every call, in call order.
    pub fn call_heads(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|keys| keys.first().map(|k| k.name.clone()).unwrap_or_default())
            .collect()
    }
}

fn echo(keys: &[LookupKey]) -> LookupResponse {
    LookupResponse {
        cards: keys
            .iter()
            .map(|k| {
                CanonicalRecord::new(
                    k.name.clone(),
                    k.set_code.clone().unwrap_or_default().to_lowercase(),
                    k.collector_number.clone().unwrap_or_default(),
                )
            })
            .collect(),
        not_found: 0,
    }
}

#[async_trait]
impl LookupService for ScriptedLookup {
    async fn lookup(&self, keys: &[LookupKey]) -> Result<LookupResponse, LookupError> {
        self.calls.lock().unwrap().push(keys.to_vec());
        let head = keys.first().map(|k| k.name.clone()).unwrap_or_default();
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&head)
            .and_then(|steps| steps.pop_front())
            .unwrap_or(Step::Echo);

        let mut step = step;
        loop {
            match step {
                Step::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    step = *inner;
                }
                Step::Echo => return Ok(echo(keys)),
                Step::Cards(cards) => {
                    return Ok(LookupResponse {
                        cards,
                        not_found: 0,
                    });
                }
                Step::Fail(e) => return Err(e),
            }
        }
    }
}

/// A 15-column export line.
pub fn export_line(name: &str, set: &str, number: &str, foil: &str, quantity: &str) -> String {
    format!(
        "{name},{set},Set {set},{number},{foil},common,{quantity},1,,0.10,false,false,near_mint,en,USD"
    )
}

/// Export text with a header and `n` distinct cards in set `TST`.
pub fn export_with_cards(n: usize) -> String {
    let mut text = String::from(HEADER_LINE);
    text.push('\n');
    for i in 0..n {
        text.push_str(&export_line(&format!("Card {i}"), "TST", &i.to_string(), "normal", "1"));
        text.push('\n');
    }
    text
}

pub fn local(name: &str, set: &str) -> LocalRecord {
    LocalRecord::new(name, set)
}

pub fn locals(n: usize) -> Vec<LocalRecord> {
    (0..n)
        .map(|i| LocalRecord::new(format!("Card {i}"), "TST").collector_number(i.to_string()))
        .collect()
}
