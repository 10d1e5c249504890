//! Application wiring: configuration, error mapping and the inventory service facade.

pub mod config;
pub mod errors;
pub mod services;

pub use config::{AppConfig, ConfigError};
pub use errors::{RejectionKind, ServiceError};
pub use services::{InventoryService, in_memory};
