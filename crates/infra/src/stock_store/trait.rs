use std::sync::Arc;

use thiserror::Error;

use socks_core::{ExpectedVersion, StockId};
use socks_inventory::{NewStockEntry, StockEntry, StockKey};

/// Stock store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, uniqueness) as
/// opposed to domain errors (validation, rejected movements).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write would create a second row for an existing (color, cotton) key.
    #[error("unique constraint violated for {0}")]
    UniqueViolation(StockKey),

    /// Optimistic concurrency check failed (stale version).
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// The row addressed by a save no longer exists.
    #[error("stock row {0} not found")]
    NotFound(StockId),

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence for stock rows.
///
/// Two lookup capabilities are exposed on purpose and are not unified:
///
/// - by composite key `(color, cotton_percent)`, used by arrivals/departures
/// - by surrogate [`StockId`], used by direct row updates
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - keep at most one row per [`StockKey`] (reject violations with
///   [`StoreError::UniqueViolation`])
/// - assign ids monotonically on insert, starting at 1, with `version = 1`
/// - check `expected` against the stored version on save and bump it by one
/// - return `list_all` / `find_by_color` in insertion (id) order
pub trait StockStore: Send + Sync {
    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockEntry>, StoreError>;

    fn find_by_id(&self, id: StockId) -> Result<Option<StockEntry>, StoreError>;

    /// All rows of one color (case-sensitive), any cotton percentage.
    fn find_by_color(&self, color: &str) -> Result<Vec<StockEntry>, StoreError>;

    /// Persist a new row and return it with its assigned id.
    fn insert(&self, entry: NewStockEntry) -> Result<StockEntry, StoreError>;

    /// Overwrite an existing row (addressed by `entry.id()`).
    fn save(&self, entry: StockEntry, expected: ExpectedVersion) -> Result<StockEntry, StoreError>;

    fn list_all(&self) -> Result<Vec<StockEntry>, StoreError>;
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockEntry>, StoreError> {
        (**self).find_by_key(key)
    }

    fn find_by_id(&self, id: StockId) -> Result<Option<StockEntry>, StoreError> {
        (**self).find_by_id(id)
    }

    fn find_by_color(&self, color: &str) -> Result<Vec<StockEntry>, StoreError> {
        (**self).find_by_color(color)
    }

    fn insert(&self, entry: NewStockEntry) -> Result<StockEntry, StoreError> {
        (**self).insert(entry)
    }

    fn save(&self, entry: StockEntry, expected: ExpectedVersion) -> Result<StockEntry, StoreError> {
        (**self).save(entry, expected)
    }

    fn list_all(&self) -> Result<Vec<StockEntry>, StoreError> {
        (**self).list_all()
    }
}
