use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use socks_core::{ExpectedVersion, StockId, Versioned};
use socks_inventory::{NewStockEntry, StockEntry, StockKey};

use super::r#trait::{StockStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    rows: BTreeMap<StockId, StockEntry>,
    /// Unique index on the composite key.
    by_key: HashMap<StockKey, StockId>,
    last_id: u64,
}

/// In-memory stock store with a unique (color, cotton) index.
///
/// Intended for tests/dev. Every operation takes the table lock once, so a
/// single `save` is an atomic compare-and-swap on the row version.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    tables: RwLock<Tables>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row count. Counts through a poisoned lock, since every write leaves
    /// the tables consistent before it can panic; the trait methods still
    /// report poisoning as [`StoreError::Unavailable`].
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl StockStore for InMemoryStockStore {
    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockEntry>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .by_key
            .get(key)
            .and_then(|id| tables.rows.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: StockId) -> Result<Option<StockEntry>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.rows.get(&id).cloned())
    }

    fn find_by_color(&self, color: &str) -> Result<Vec<StockEntry>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .rows
            .values()
            .filter(|e| e.color() == color)
            .cloned()
            .collect())
    }

    fn insert(&self, entry: NewStockEntry) -> Result<StockEntry, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        if tables.by_key.contains_key(&entry.key) {
            return Err(StoreError::UniqueViolation(entry.key));
        }

        tables.last_id += 1;
        let id = StockId::from_raw(tables.last_id);
        let stored = StockEntry::from_parts(id, entry.key.clone(), entry.quantity, 1);

        tables.by_key.insert(entry.key, id);
        tables.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn save(&self, entry: StockEntry, expected: ExpectedVersion) -> Result<StockEntry, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let id = entry.id();

        let (current_key, current_version) = match tables.rows.get(&id) {
            Some(current) => (current.key().clone(), current.version()),
            None => return Err(StoreError::NotFound(id)),
        };

        expected
            .check(current_version)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        if entry.key() != &current_key {
            if let Some(other) = tables.by_key.get(entry.key()) {
                if *other != id {
                    return Err(StoreError::UniqueViolation(entry.key().clone()));
                }
            }
            tables.by_key.remove(&current_key);
            tables.by_key.insert(entry.key().clone(), id);
        }

        let stored = StockEntry::from_parts(
            id,
            entry.key().clone(),
            entry.quantity(),
            current_version + 1,
        );
        tables.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn list_all(&self) -> Result<Vec<StockEntry>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.rows.values().cloned().collect())
    }
}
