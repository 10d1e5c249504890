//! Bulk loading of stock from tabular sources.
//!
//! Two paths with deliberately different failure policies:
//!
//! - [`BatchImporter::import_rows`] writes rows straight into the store and
//!   aborts on the first bad row (earlier writes stay)
//! - [`snapshot::load_snapshot_csv`] fills a query snapshot and skips rows
//!   whose numeric fields fail to parse

pub mod snapshot;
pub mod source;

use thiserror::Error;

use socks_inventory::{NewStockEntry, StockKey};

use crate::stock_store::{StockStore, StoreError};

pub use snapshot::{load_snapshot, load_snapshot_csv, read_snapshot_csv};
pub use source::{Cell, CsvSheet, InMemorySheet, Row, TabularSource, WorkbookSheet};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    #[error("import source is empty")]
    EmptyInput,

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to read source: {0}")]
    Read(String),

    /// `row` is 1-based and counts the header row.
    #[error("row {row}: {reason}")]
    Parse { row: usize, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

const COLOR_COLUMN: usize = 0;
const COTTON_COLUMN: usize = 1;
const QUANTITY_COLUMN: usize = 2;

/// Raw loader: every data row becomes a new stored row, no merge by key.
#[derive(Debug)]
pub struct BatchImporter<S> {
    store: S,
}

impl<S> BatchImporter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: StockStore> BatchImporter<S> {
    /// Import every row after the header; returns the number of rows written.
    ///
    /// One store write per row, no surrounding transaction: on failure the rows
    /// already written remain.
    pub fn import_rows<T>(&self, source: &mut T) -> Result<usize, ImportError>
    where
        T: TabularSource + ?Sized,
    {
        let name = source.name().to_string();
        tracing::info!(source = %name, "importing stock batch");

        if source.is_empty() {
            tracing::error!(source = %name, "import source is empty");
            return Err(ImportError::EmptyInput);
        }

        let mut imported = 0usize;
        for (index, row) in source.rows().enumerate() {
            // The header is skipped only once it has been read cleanly.
            let result = match (index, row) {
                (0, Ok(_)) => continue,
                (_, row) => row,
            };

            let result = result
                .and_then(|row| parse_row(index + 1, &row))
                .and_then(|entry| self.store.insert(entry).map_err(ImportError::from));

            if let Err(e) = result {
                tracing::error!(source = %name, imported, error = %e, "stock batch import aborted");
                return Err(e);
            }
            imported += 1;
        }

        tracing::info!(source = %name, imported, "stock batch imported");
        Ok(imported)
    }
}

fn parse_row(row_number: usize, row: &[Cell]) -> Result<NewStockEntry, ImportError> {
    let parse_err = |reason: String| ImportError::Parse {
        row: row_number,
        reason,
    };

    let color = match row.get(COLOR_COLUMN) {
        Some(Cell::Text(text)) => text.clone(),
        Some(other) => return Err(parse_err(format!("color must be text, found {}", other.kind()))),
        None => return Err(parse_err("missing color cell".to_string())),
    };

    let cotton = numeric_cell(row, COTTON_COLUMN, "cotton").map_err(&parse_err)?;
    if cotton < f64::from(i32::MIN) || cotton > f64::from(i32::MAX) {
        return Err(parse_err(format!("cotton {cotton} is out of range")));
    }

    let quantity = numeric_cell(row, QUANTITY_COLUMN, "quantity").map_err(&parse_err)?;
    if quantity < 0.0 || quantity > f64::from(u32::MAX) {
        return Err(parse_err(format!("quantity {quantity} is out of range")));
    }

    Ok(NewStockEntry::new(
        StockKey::new(color, cotton as i32),
        quantity as u32,
    ))
}

/// Read a numeric cell truncated toward zero.
fn numeric_cell(row: &[Cell], column: usize, name: &str) -> Result<f64, String> {
    match row.get(column) {
        Some(Cell::Number(n)) if n.is_finite() => Ok(n.trunc()),
        Some(Cell::Number(n)) => Err(format!("{name} must be finite, found {n}")),
        Some(other) => Err(format!("{name} must be numeric, found {}", other.kind())),
        None => Err(format!("missing {name} cell")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::stock_store::InMemoryStockStore;

    fn header() -> Row {
        vec![Cell::text("color"), Cell::text("cotton"), Cell::text("quantity")]
    }

    fn data(color: &str, cotton: f64, quantity: f64) -> Row {
        vec![Cell::text(color), Cell::Number(cotton), Cell::Number(quantity)]
    }

    fn setup() -> (BatchImporter<Arc<InMemoryStockStore>>, Arc<InMemoryStockStore>) {
        let store = Arc::new(InMemoryStockStore::new());
        (BatchImporter::new(store.clone()), store)
    }

    #[test]
    fn empty_source_is_rejected_without_writes() {
        let (importer, store) = setup();
        let err = importer
            .import_rows(&mut InMemorySheet::new("empty.xlsx", vec![]))
            .unwrap_err();
        assert_eq!(err, ImportError::EmptyInput);
        assert!(store.is_empty());
    }

    #[test]
    fn header_only_imports_nothing() {
        let (importer, store) = setup();
        let count = importer
            .import_rows(&mut InMemorySheet::new("header.xlsx", vec![header()]))
            .unwrap();
        assert_eq!(count, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn first_row_is_skipped_even_when_it_looks_like_data() {
        let (importer, store) = setup();
        let mut sheet = InMemorySheet::new(
            "batch.xlsx",
            vec![data("Red", 40.0, 100.0), data("Blue", 70.0, 10.0)],
        );
        assert_eq!(importer.import_rows(&mut sheet).unwrap(), 1);
        assert!(store.find_by_key(&StockKey::new("Red", 40)).unwrap().is_none());
    }

    #[test]
    fn imports_rows_in_order_with_truncation() {
        let (importer, store) = setup();
        let mut sheet = InMemorySheet::new(
            "batch.xlsx",
            vec![header(), data("Red", 40.9, 100.2), data("Green", 60.0, 50.99)],
        );

        assert_eq!(importer.import_rows(&mut sheet).unwrap(), 2);

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key(), &StockKey::new("Red", 40));
        assert_eq!(all[0].quantity(), 100);
        assert_eq!(all[1].key(), &StockKey::new("Green", 60));
        assert_eq!(all[1].quantity(), 50);
    }

    #[test]
    fn cotton_is_not_range_checked() {
        let (importer, store) = setup();
        let mut sheet = InMemorySheet::new("batch.xlsx", vec![header(), data("Odd", 150.0, 1.0)]);
        assert_eq!(importer.import_rows(&mut sheet).unwrap(), 1);
        assert!(store.find_by_key(&StockKey::new("Odd", 150)).unwrap().is_some());
    }

    #[test]
    fn bad_third_row_aborts_and_keeps_earlier_writes() {
        let (importer, store) = setup();
        let mut sheet = InMemorySheet::new(
            "batch.xlsx",
            vec![
                header(),
                data("Red", 40.0, 100.0),
                data("Blue", 70.0, 10.0),
                vec![Cell::text("Green"), Cell::text("sixty"), Cell::Number(50.0)],
                data("Black", 20.0, 5.0),
            ],
        );

        let err = importer.import_rows(&mut sheet).unwrap_err();
        match err {
            ImportError::Parse { row, reason } => {
                assert_eq!(row, 4);
                assert!(reason.contains("cotton must be numeric"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(store.len(), 2);
        assert!(store.find_by_key(&StockKey::new("Black", 20)).unwrap().is_none());
    }

    #[test]
    fn missing_cell_is_a_parse_error() {
        let (importer, _store) = setup();
        let mut sheet = InMemorySheet::new(
            "batch.xlsx",
            vec![header(), vec![Cell::text("Red"), Cell::Number(40.0)]],
        );
        let err = importer.import_rows(&mut sheet).unwrap_err();
        assert!(matches!(err, ImportError::Parse { row: 2, reason } if reason.contains("missing quantity")));
    }

    #[test]
    fn numeric_color_and_negative_quantity_are_parse_errors() {
        let (importer, _store) = setup();
        let mut numeric_color = InMemorySheet::new(
            "batch.xlsx",
            vec![header(), vec![Cell::Number(1.0), Cell::Number(40.0), Cell::Number(1.0)]],
        );
        assert!(matches!(
            importer.import_rows(&mut numeric_color).unwrap_err(),
            ImportError::Parse { .. }
        ));

        let mut negative = InMemorySheet::new("batch.xlsx", vec![header(), data("Red", 40.0, -3.0)]);
        assert!(matches!(
            importer.import_rows(&mut negative).unwrap_err(),
            ImportError::Parse { .. }
        ));
    }

    #[test]
    fn duplicate_key_aborts_with_store_error() {
        let (importer, store) = setup();
        let mut sheet = InMemorySheet::new(
            "batch.xlsx",
            vec![header(), data("Red", 40.0, 1.0), data("Red", 40.0, 2.0)],
        );
        let err = importer.import_rows(&mut sheet).unwrap_err();
        assert_eq!(
            err,
            ImportError::Store(StoreError::UniqueViolation(StockKey::new("Red", 40)))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn imports_from_csv_sheet() {
        let (importer, store) = setup();
        let mut sheet = CsvSheet::from_bytes(
            "batch.csv",
            "color,cotton,quantity\nRed,40,100\nBlue,70,10\n\nGreen,60,50\n",
        );
        assert_eq!(importer.import_rows(&mut sheet).unwrap(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unreadable_header_aborts_the_import() {
        let (importer, store) = setup();
        let mut bytes = vec![0xff, 0xfe, b',', b'x', b'\n'];
        bytes.extend_from_slice(b"Red,40,100\nBlue,70,10\n");
        let mut sheet = CsvSheet::from_bytes("batch.csv", bytes);

        let err = importer.import_rows(&mut sheet).unwrap_err();
        assert!(matches!(err, ImportError::Read(_)), "got {err:?}");
        assert!(store.is_empty());
    }

    #[test]
    fn imports_first_worksheet_of_a_workbook() {
        let (importer, store) = setup();
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/stock_batch.xlsx");
        let mut sheet = WorkbookSheet::from_path(path).unwrap();

        assert_eq!(importer.import_rows(&mut sheet).unwrap(), 3);
        let blue = store.find_by_key(&StockKey::new("Blue", 70)).unwrap().unwrap();
        assert_eq!(blue.quantity(), 10);
    }

    #[test]
    fn workbook_text_in_numeric_column_aborts() {
        let (importer, store) = setup();
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures/stock_batch_bad_cotton.xlsx");
        let mut sheet = WorkbookSheet::from_path(path).unwrap();

        let err = importer.import_rows(&mut sheet).unwrap_err();
        assert!(matches!(err, ImportError::Parse { row: 3, ref reason } if reason.contains("cotton must be numeric")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_csv_is_rejected() {
        let (importer, _store) = setup();
        let err = importer
            .import_rows(&mut CsvSheet::from_bytes("batch.csv", ""))
            .unwrap_err();
        assert_eq!(err, ImportError::EmptyInput);
    }
}
