//! Sock inventory domain module.
//!
//! This crate contains the business rules for sock stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - [`stock`]: stock entries keyed by (color, cotton percentage) and the
//!   arrival/departure decision rules
//! - [`query`]: the snapshot read model and its filter/sort evaluator

pub mod query;
pub mod stock;

pub use query::{SortKey, StockQuery, StockSnapshot, filter_and_sort};
pub use stock::{
    COTTON_PERCENT_RANGE, Movement, NewStockEntry, StockEntry, StockKey, StockLevel, StockUpdate,
};
