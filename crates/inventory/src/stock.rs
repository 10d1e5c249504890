use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use socks_core::{DomainError, DomainResult, StockId, Versioned};

/// Accepted cotton percentages for an arrival.
pub const COTTON_PERCENT_RANGE: RangeInclusive<i32> = 0..=100;

/// Composite identity of a stock class: socks are fungible within it.
///
/// Color comparison is case-sensitive here; only the query evaluator folds case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub color: String,
    #[serde(rename = "cotton")]
    pub cotton_percent: i32,
}

impl StockKey {
    pub fn new(color: impl Into<String>, cotton_percent: i32) -> Self {
        Self {
            color: color.into(),
            cotton_percent,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}%", self.color, self.cotton_percent)
    }
}

/// Requested stock movement (arrival or departure).
///
/// `quantity` is always the size of the change; the direction comes from the
/// operation it is submitted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub color: String,
    #[serde(rename = "cotton")]
    pub cotton_percent: i32,
    pub quantity: u32,
}

impl Movement {
    pub fn new(color: impl Into<String>, cotton_percent: i32, quantity: u32) -> Self {
        Self {
            color: color.into(),
            cotton_percent,
            quantity,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.color.clone(), self.cotton_percent)
    }

    /// Arrivals must name a cotton percentage within [`COTTON_PERCENT_RANGE`].
    ///
    /// Departures, updates and imports deliberately skip this check.
    pub fn validate_for_arrival(&self) -> DomainResult<()> {
        if !COTTON_PERCENT_RANGE.contains(&self.cotton_percent) {
            return Err(DomainError::validation(format!(
                "cotton percentage must be within 0-100 (got {})",
                self.cotton_percent
            )));
        }
        Ok(())
    }
}

/// Replacement values for a stored row, addressed by its surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub color: String,
    #[serde(rename = "cotton")]
    pub cotton_percent: i32,
    pub quantity: u32,
}

impl StockUpdate {
    pub fn new(color: impl Into<String>, cotton_percent: i32, quantity: u32) -> Self {
        Self {
            color: color.into(),
            cotton_percent,
            quantity,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.color.clone(), self.cotton_percent)
    }
}

/// A row that has not been persisted yet (no id, no version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockEntry {
    pub key: StockKey,
    pub quantity: u32,
}

impl NewStockEntry {
    pub fn new(key: StockKey, quantity: u32) -> Self {
        Self { key, quantity }
    }
}

/// Persisted stock row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEntry {
    id: StockId,
    key: StockKey,
    quantity: u32,
    version: u64,
}

impl StockEntry {
    /// Rebuild a row from stored parts. Only stores should need this.
    pub fn from_parts(id: StockId, key: StockKey, quantity: u32, version: u64) -> Self {
        Self {
            id,
            key,
            quantity,
            version,
        }
    }

    pub fn id(&self) -> StockId {
        self.id
    }

    pub fn key(&self) -> &StockKey {
        &self.key
    }

    pub fn color(&self) -> &str {
        &self.key.color
    }

    pub fn cotton_percent(&self) -> i32 {
        self.key.cotton_percent
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Merge an arrival into this row.
    ///
    /// Returns the updated row; the stored version is left for the store to bump.
    pub fn receive(&self, quantity: u32) -> DomainResult<StockEntry> {
        let new_quantity = self.quantity.checked_add(quantity).ok_or_else(|| {
            DomainError::validation(format!(
                "arrival of {quantity} would overflow stock for {}",
                self.key
            ))
        })?;
        Ok(StockEntry {
            quantity: new_quantity,
            ..self.clone()
        })
    }

    /// Take a departure out of this row.
    ///
    /// Reaching exactly zero is allowed; the row is kept.
    pub fn release(&self, quantity: u32) -> DomainResult<StockEntry> {
        if self.quantity < quantity {
            return Err(DomainError::rejected(format!(
                "insufficient stock for {} (available: {}, requested: {quantity})",
                self.key, self.quantity
            )));
        }
        Ok(StockEntry {
            quantity: self.quantity - quantity,
            ..self.clone()
        })
    }

    /// Overwrite every field addressed by an update, regardless of prior values.
    pub fn overwrite(&self, update: &StockUpdate) -> StockEntry {
        StockEntry {
            key: update.key(),
            quantity: update.quantity,
            ..self.clone()
        }
    }

    pub fn to_level(&self) -> StockLevel {
        StockLevel {
            id: Some(self.id),
            color: self.key.color.clone(),
            cotton_percent: self.key.cotton_percent,
            quantity: self.quantity,
        }
    }
}

impl Versioned for StockEntry {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Externally visible stock tuple: what operations return and what snapshots hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StockId>,
    pub color: String,
    #[serde(rename = "cotton")]
    pub cotton_percent: i32,
    pub quantity: u32,
}

impl StockLevel {
    pub fn new(color: impl Into<String>, cotton_percent: i32, quantity: u32) -> Self {
        Self {
            id: None,
            color: color.into(),
            cotton_percent,
            quantity,
        }
    }

    pub fn with_id(mut self, id: StockId) -> Self {
        self.id = Some(id);
        self
    }
}
