//! Scanner export parsing: raw tabular text into [`LocalRecord`]s.
//!
//! The first line is a header and is skipped. Columns are positional:
//!
//! | # | column |
//! |---|---|
//! | 0 | name |
//! | 1 | set code |
//! | 2 | set name |
//! | 3 | collector number |
//! | 4 | foil token |
//! | 5 | rarity |
//! | 6 | quantity |
//! | 7 | scanner id |
//! | 8 | card-database id |
//! | 9 | purchase price |
//! | 10 | misprint |
//! | 11 | altered |
//! | 12 | condition |
//! | 13 | language |
//! | 14 | purchase price currency |

use std::mem::take;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::LocalRecord;

/// Minimum number of columns a data line must yield.
pub const REQUIRED_FIELDS: usize = 15;

pub const DEFAULT_DELIMITER: char = ',';

/// Why a data line was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkipReason {
    TooFewFields { found: usize },
    EmptyName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewFields { found } => {
                write!(f, "expected {REQUIRED_FIELDS} fields, found {found}")
            }
            SkipReason::EmptyName => write!(f, "empty card name"),
        }
    }
}

/// Diagnostic for a dropped line. `line` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedInventory {
    /// Accepted rows, in input order.
    pub records: Vec<LocalRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse a comma-delimited scanner export.
pub fn parse(text: &str) -> ParsedInventory {
    parse_with_delimiter(text, DEFAULT_DELIMITER)
}

pub fn parse_with_delimiter(text: &str, delimiter: char) -> ParsedInventory {
    let mut parsed = ParsedInventory::default();

    for (idx, line) in text.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        // Blank lines carry no row at all; they are not diagnostics.
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, delimiter) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(line = line_no, %reason, "skipping inventory line");
                parsed.skipped.push(SkippedLine {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    debug!(
        accepted = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "inventory parsed"
    );
    parsed
}

/// Split one line on `delimiter`, honouring quotes.
///
/// A quote toggles quoted mode and is never part of the value; the
/// delimiter separates fields only outside quotes.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn parse_line(line: &str, delimiter: char) -> Result<LocalRecord, SkipReason> {
    let fields = split_fields(line, delimiter);
    if fields.len() < REQUIRED_FIELDS {
        return Err(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }
    let f: Vec<&str> = fields.iter().map(|s| s.trim()).collect();

    let name = f[0];
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }

    Ok(LocalRecord {
        name: name.to_string(),
        set_code: f[1].to_string(),
        set_name: f[2].to_string(),
        collector_number: f[3].to_string(),
        foil: is_foil_token(f[4]),
        rarity: f[5].to_string(),
        quantity: parse_quantity(f[6]),
        source_id: f[7].to_string(),
        external_id: Some(f[8]).filter(|s| !s.is_empty()).map(str::to_string),
        purchase_price: Decimal::from_str(f[9]).unwrap_or(Decimal::ZERO),
        misprint: f[10].eq_ignore_ascii_case("true"),
        altered: f[11].eq_ignore_ascii_case("true"),
        condition: f[12].to_string(),
        language: f[13].to_string(),
        purchase_price_currency: f[14].to_string(),
    })
}

/// Foil column: only `foil` (any case) is truthy.
fn is_foil_token(token: &str) -> bool {
    token.eq_ignore_ascii_case("foil")
}

fn parse_quantity(raw: &str) -> u32 {
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_protect_delimiters_and_are_dropped() {
        let fields = split_fields(r#"a,"b, c",d"#, ',');
        assert_eq!(fields, vec!["a", "b, c", "d"]);
    }

    #[test]
    fn doubled_quotes_just_toggle_twice() {
        let fields = split_fields(r#""say ""hi""",x"#, ',');
        assert_eq!(fields, vec!["say hi", "x"]);
    }

    #[test]
    fn quantity_fails_soft() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity("three"), 1);
        assert_eq!(parse_quantity("0"), 1);
        assert_eq!(parse_quantity(""), 1);
    }
}
