//! Stock record store boundary.
//!
//! The ledger and importer only need a key-value lookup and an upsert; this
//! module defines that abstraction without assuming a storage engine.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStockStore;
pub use r#trait::{StockStore, StoreError};
