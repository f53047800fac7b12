//! Rendering rows into the catalog file text.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::error;

use crate::error::{Error, Result};

/// Replaces line breaks inside a field so each row stays on one line.
pub const LINE_BREAK_MARKER: &str = "<br>";

/// Serialized catalog text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFile {
    pub text: String,
    /// Data rows, header excluded.
    pub rows: usize,
}

impl CatalogFile {
    /// An empty file is not a deliverable.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Render `header` and `rows`, one line each, every field quoted.
///
/// Embedded quotes are doubled and embedded line breaks become
/// [`LINE_BREAK_MARKER`]. No rows yields an empty file, not an error.
pub fn serialize<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> Result<CatalogFile> {
    if rows.is_empty() {
        error!("no catalog rows to serialize");
        return Ok(CatalogFile::default());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(header.iter().map(|h| flatten_newlines(h.as_ref())))?;
    for row in rows {
        writer.write_record(row.iter().map(|field| flatten_newlines(field)))?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let text = String::from_utf8(bytes).map_err(|e| Error::Other(format!("catalog not utf-8: {e}")))?;
    Ok(CatalogFile {
        text,
        rows: rows.len(),
    })
}

fn flatten_newlines(field: &str) -> String {
    field
        .replace("\r\n", LINE_BREAK_MARKER)
        .replace(['\n', '\r'], LINE_BREAK_MARKER)
}
