//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Surrogate identifier of a stored stock row.
///
/// Assigned by the store on insert, independent of the (color, cotton) key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(u64);

macro_rules! impl_u64_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_u64_newtype!(StockId, "StockId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let id: StockId = " 17 ".parse().unwrap();
        assert_eq!(id, StockId::from_raw(17));
        assert_eq!(id.to_string(), "17");
    }

    #[test]
    fn rejects_non_numeric() {
        let err = "ID".parse::<StockId>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("StockId")));
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&StockId::from_raw(5)).unwrap();
        assert_eq!(json, "5");
    }
}
