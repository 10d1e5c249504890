//! Building query snapshots: from the store, or from a delimited file.

use std::io::Read;
use std::path::Path;

use socks_core::StockId;
use socks_inventory::{StockLevel, StockSnapshot};

use super::ImportError;
use crate::stock_store::{StockStore, StoreError};

/// Explicit refresh step: copy the store's current rows into a fresh snapshot.
pub fn load_snapshot<S>(store: &S) -> Result<StockSnapshot, StoreError>
where
    S: StockStore + ?Sized,
{
    let snapshot: StockSnapshot = store.list_all()?.iter().map(|e| e.to_level()).collect();
    tracing::debug!(entries = snapshot.len(), "stock snapshot loaded from store");
    Ok(snapshot)
}

/// Append rows from a delimited file (`ID,Color,Cotton,Quantity`) to `snapshot`.
///
/// A missing or unreadable file fails the whole load.
pub fn load_snapshot_csv(
    path: impl AsRef<Path>,
    snapshot: &mut StockSnapshot,
) -> Result<usize, ImportError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "loading stock snapshot from csv");

    let file = std::fs::File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "snapshot file cannot be read");
        ImportError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    read_snapshot_csv(file, snapshot)
}

/// Reader-based core of [`load_snapshot_csv`].
///
/// Columns are positional; there is no header handling, so a header line is
/// skipped like any other row whose numeric columns fail to parse. Fields are
/// taken verbatim (`" 60 "` is not a number). A record with fewer than four
/// fields aborts the load with [`ImportError::Parse`].
pub fn read_snapshot_csv<R: Read>(
    reader: R,
    snapshot: &mut StockSnapshot,
) -> Result<usize, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut loaded = 0usize;
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Read(e.to_string()))?;
        let line = index + 1;

        if record.len() < SNAPSHOT_COLUMNS.len() {
            tracing::error!(line, fields = record.len(), "snapshot row is missing columns");
            return Err(ImportError::Parse {
                row: line,
                reason: format!(
                    "expected {} columns, found {}",
                    SNAPSHOT_COLUMNS.len(),
                    record.len()
                ),
            });
        }

        match parse_record(&record) {
            Ok(level) => {
                snapshot.push(level);
                loaded += 1;
            }
            Err(reason) => {
                tracing::warn!(line, %reason, "skipping snapshot row");
            }
        }
    }

    tracing::info!(loaded, total = snapshot.len(), "stock snapshot rows loaded");
    Ok(loaded)
}

const SNAPSHOT_COLUMNS: [&str; 4] = ["ID", "Color", "Cotton", "Quantity"];

/// Numeric failures only; column count is checked by the caller.
fn parse_record(record: &csv::StringRecord) -> Result<StockLevel, String> {
    let id = record[0]
        .parse::<u64>()
        .map(StockId::from_raw)
        .map_err(|e| format!("ID: {e}"))?;
    let color = record[1].to_string();
    let cotton: i32 = record[2]
        .parse()
        .map_err(|e| format!("Cotton: {e}"))?;
    let quantity: u32 = record[3]
        .parse()
        .map_err(|e| format!("Quantity: {e}"))?;

    Ok(StockLevel::new(color, cotton, quantity).with_id(id))
}
