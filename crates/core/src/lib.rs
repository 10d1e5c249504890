//! `socks-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no parsing).

pub mod version;
pub mod error;
pub mod id;

pub use version::{ExpectedVersion, Versioned};
pub use error::{DomainError, DomainResult};
pub use id::StockId;
