use std::path::Path;
use std::sync::{Arc, RwLock};

use socks_core::StockId;
use socks_infra::{
    BatchImporter, InMemoryStockStore, StockLedger, StockStore, TabularSource, load_snapshot,
    load_snapshot_csv,
};
use socks_inventory::{
    Movement, StockLevel, StockQuery, StockSnapshot, StockUpdate, filter_and_sort,
};

use crate::errors::ServiceError;

/// Inventory operations behind one handle: ledger, importer and the query snapshot.
///
/// The snapshot is owned here rather than shared process-wide. It changes only
/// through [`refresh_snapshot`](Self::refresh_snapshot),
/// [`load_snapshot_csv`](Self::load_snapshot_csv) and
/// [`replace_snapshot`](Self::replace_snapshot); ledger writes and batch
/// imports do not touch it.
#[derive(Debug)]
pub struct InventoryService<S> {
    store: S,
    ledger: StockLedger<S>,
    importer: BatchImporter<S>,
    snapshot: RwLock<StockSnapshot>,
}

/// Service over a fresh in-memory store.
pub fn in_memory() -> InventoryService<Arc<InMemoryStockStore>> {
    InventoryService::new(Arc::new(InMemoryStockStore::new()))
}

impl<S> InventoryService<S>
where
    S: StockStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ledger: StockLedger::new(store.clone()),
            importer: BatchImporter::new(store.clone()),
            store,
            snapshot: RwLock::new(StockSnapshot::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_arrival(&self, movement: &Movement) -> Result<StockLevel, ServiceError> {
        Ok(self.ledger.record_arrival(movement)?)
    }

    pub fn record_departure(&self, movement: &Movement) -> Result<StockLevel, ServiceError> {
        Ok(self.ledger.record_departure(movement)?)
    }

    pub fn update_entry(&self, id: StockId, update: &StockUpdate) -> Result<StockLevel, ServiceError> {
        Ok(self.ledger.update_entry(id, update)?)
    }

    /// Stored rows of one color (case-sensitive), straight from the store.
    pub fn stock_for_color(&self, color: &str) -> Result<Vec<StockLevel>, ServiceError> {
        Ok(self
            .store
            .find_by_color(color)?
            .iter()
            .map(|e| e.to_level())
            .collect())
    }

    /// Evaluate a query against the current snapshot.
    pub fn filter_stock(&self, query: &StockQuery) -> Result<Vec<StockLevel>, ServiceError> {
        let snapshot = self.snapshot.read().map_err(|_| poisoned())?;
        Ok(filter_and_sort(&snapshot, query))
    }

    pub fn import_batch<T>(&self, source: &mut T) -> Result<usize, ServiceError>
    where
        T: TabularSource + ?Sized,
    {
        Ok(self.importer.import_rows(source)?)
    }

    /// Replace the snapshot with the store's current rows. Returns the new size.
    pub fn refresh_snapshot(&self) -> Result<usize, ServiceError> {
        let fresh = load_snapshot(&self.store)?;
        let len = fresh.len();
        self.replace_snapshot(fresh)?;
        tracing::info!(entries = len, "stock snapshot refreshed");
        Ok(len)
    }

    /// Append rows from a delimited snapshot file. Returns the number appended.
    pub fn load_snapshot_csv(&self, path: impl AsRef<Path>) -> Result<usize, ServiceError> {
        let mut snapshot = self.snapshot.write().map_err(|_| poisoned())?;
        Ok(load_snapshot_csv(path, &mut snapshot)?)
    }

    pub fn replace_snapshot(&self, snapshot: StockSnapshot) -> Result<(), ServiceError> {
        *self.snapshot.write().map_err(|_| poisoned())? = snapshot;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<StockSnapshot, ServiceError> {
        Ok(self.snapshot.read().map_err(|_| poisoned())?.clone())
    }
}

fn poisoned() -> ServiceError {
    ServiceError::Internal("snapshot lock poisoned".to_string())
}
