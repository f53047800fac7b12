//! Storefront catalog output: row mapping and serialization.

pub mod row;
pub mod serialize;

pub use row::{HEADER, RowRejection, to_row};
pub use serialize::{CatalogFile, LINE_BREAK_MARKER, serialize};

use tracing::{info, warn};

use crate::error::Result;
use crate::event::{Emitter, EventKind};
use crate::model::ReconciledCatalog;
use crate::telemetry::metrics;

/// Map every reconciled record and serialize the survivors.
///
/// Rejected records are reported and left out. An empty result is
/// reported as an error event and returned as an empty file.
pub fn export(catalog: &ReconciledCatalog, events: &Emitter<'_>) -> Result<CatalogFile> {
    let mut rows = Vec::with_capacity(catalog.len());
    for record in catalog {
        match to_row(record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                warn!(name = %record.card.name, %reason, "catalog row rejected");
                events.warning(EventKind::RowRejected {
                    name: record.card.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    let file = serialize(&HEADER, &rows)?;
    if file.is_empty() {
        events.error(EventKind::CatalogEmpty);
    } else {
        metrics::catalog_rows_written().add(file.rows as u64, &[]);
        info!(rows = file.rows, "catalog serialized");
        events.success(EventKind::CatalogWritten { rows: file.rows });
    }
    Ok(file)
}
