//! Infrastructure layer: stock store, ledger orchestration, batch import.

pub mod import;
pub mod ledger;
pub mod stock_store;


pub use import::{
    BatchImporter, Cell, CsvSheet, ImportError, InMemorySheet, Row, TabularSource, load_snapshot,
    load_snapshot_csv, read_snapshot_csv, WorkbookSheet,
};
pub use ledger::{LedgerError, StockLedger};
pub use stock_store::{InMemoryStockStore, StockStore, StoreError};
