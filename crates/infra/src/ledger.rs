//! Stock ledger: single-item movements against a [`StockStore`].
//!
//! ## Execution Flow
//!
//! ```text
//! Movement
//!   ↓
//! 1. Per-operation validation (arrivals only range-check cotton)
//!   ↓
//! 2. Load row by (color, cotton) key, or by id for updates
//!   ↓
//! 3. Decide the new row (pure rules on `StockEntry`)
//!   ↓
//! 4. One write: insert, or save with the loaded version as expectation
//! ```
//!
//! Rejections happen before step 4, so a refused movement never touches the
//! store. A stale version at step 4 surfaces as [`LedgerError::Store`] with a
//! [`StoreError::Conflict`]; the ledger never retries.

use thiserror::Error;

use socks_core::{DomainError, ExpectedVersion, StockId, Versioned};
use socks_inventory::{Movement, NewStockEntry, StockLevel, StockUpdate};

use crate::stock_store::{StockStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Input failed validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Departure refused (missing key or insufficient stock); nothing was written.
    #[error("movement rejected: {0}")]
    Rejected(String),

    /// No row exists at the addressed id.
    #[error("stock row not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::Rejected(msg) => LedgerError::Rejected(msg),
            DomainError::Conflict(msg) => LedgerError::Store(StoreError::Conflict(msg)),
        }
    }
}

/// Applies arrivals, departures and row updates through a store.
#[derive(Debug)]
pub struct StockLedger<S> {
    store: S,
}

impl<S> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: StockStore> StockLedger<S> {
    /// Register an arrival, merging into the existing row for the key if any.
    pub fn record_arrival(&self, movement: &Movement) -> Result<StockLevel, LedgerError> {
        tracing::info!(
            color = %movement.color,
            cotton = movement.cotton_percent,
            quantity = movement.quantity,
            "recording arrival"
        );

        if let Err(e) = movement.validate_for_arrival() {
            tracing::warn!(error = %e, "arrival rejected by validation");
            return Err(e.into());
        }

        let key = movement.key();
        let stored = match self.store.find_by_key(&key)? {
            Some(existing) => {
                let expected = ExpectedVersion::Exact(existing.version());
                let merged = existing.receive(movement.quantity)?;
                let saved = self.store.save(merged, expected)?;
                tracing::info!(id = %saved.id(), quantity = saved.quantity(), "stock quantity increased");
                saved
            }
            None => {
                let created = self
                    .store
                    .insert(NewStockEntry::new(key, movement.quantity))?;
                tracing::info!(id = %created.id(), quantity = created.quantity(), "stock row created");
                created
            }
        };

        Ok(stored.to_level())
    }

    /// Register a departure. Reaching zero keeps the row.
    pub fn record_departure(&self, movement: &Movement) -> Result<StockLevel, LedgerError> {
        tracing::info!(
            color = %movement.color,
            cotton = movement.cotton_percent,
            quantity = movement.quantity,
            "recording departure"
        );

        let key = movement.key();
        let Some(existing) = self.store.find_by_key(&key)? else {
            tracing::warn!(key = %key, "departure rejected: no stock for key");
            return Err(LedgerError::Rejected(format!("no stock for {key}")));
        };

        let expected = ExpectedVersion::Exact(existing.version());
        let reduced = match existing.release(movement.quantity) {
            Ok(reduced) => reduced,
            Err(e) => {
                tracing::warn!(error = %e, "departure rejected");
                return Err(e.into());
            }
        };

        let saved = self.store.save(reduced, expected)?;
        tracing::info!(id = %saved.id(), quantity = saved.quantity(), "stock quantity decreased");
        Ok(saved.to_level())
    }

    /// Overwrite color, cotton and quantity of the row stored at `id`.
    pub fn update_entry(&self, id: StockId, update: &StockUpdate) -> Result<StockLevel, LedgerError> {
        tracing::info!(%id, ?update, "updating stock row");

        let Some(existing) = self.store.find_by_id(id)? else {
            tracing::error!(%id, "stock row not found");
            return Err(LedgerError::NotFound);
        };

        let expected = ExpectedVersion::Exact(existing.version());
        let saved = self.store.save(existing.overwrite(update), expected)?;
        tracing::info!(%id, "stock row updated");
        Ok(saved.to_level())
    }
}
