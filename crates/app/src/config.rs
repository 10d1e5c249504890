//! Process configuration from environment variables.

use std::path::PathBuf;

use thiserror::Error;

use socks_inventory::StockQuery;

pub const LOG_FILTER_VAR: &str = "SOCKS_LOG";
pub const SNAPSHOT_CSV_VAR: &str = "SOCKS_SNAPSHOT_CSV";
pub const BATCH_FILE_VAR: &str = "SOCKS_BATCH_FILE";
pub const QUERY_COLOR_VAR: &str = "SOCKS_QUERY_COLOR";
pub const QUERY_MIN_COTTON_VAR: &str = "SOCKS_QUERY_MIN_COTTON";
pub const QUERY_MAX_COTTON_VAR: &str = "SOCKS_QUERY_MAX_COTTON";
pub const QUERY_SORT_BY_VAR: &str = "SOCKS_QUERY_SORT_BY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Delimited snapshot file appended to the query snapshot at startup.
    pub snapshot_csv: Option<PathBuf>,
    /// Comma-delimited batch imported into the store at startup.
    pub batch_file: Option<PathBuf>,
    /// Query evaluated by the `socks` binary.
    pub query: StockQuery,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: socks_observability::DEFAULT_FILTER.to_string(),
            snapshot_csv: None,
            batch_file: None,
            query: StockQuery::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut query = StockQuery::new();
        query.color = get(QUERY_COLOR_VAR);
        query.min_cotton = parse_i32(QUERY_MIN_COTTON_VAR, get(QUERY_MIN_COTTON_VAR))?;
        query.max_cotton = parse_i32(QUERY_MAX_COTTON_VAR, get(QUERY_MAX_COTTON_VAR))?;
        if let Some(raw) = get(QUERY_SORT_BY_VAR) {
            query = query.sort_by_raw(&raw);
        }

        Ok(Self {
            log_filter: get(LOG_FILTER_VAR).unwrap_or(defaults.log_filter),
            snapshot_csv: get(SNAPSHOT_CSV_VAR).map(PathBuf::from),
            batch_file: get(BATCH_FILE_VAR).map(PathBuf::from),
            query,
        })
    }
}

fn parse_i32(key: &'static str, raw: Option<String>) -> Result<Option<i32>, ConfigError> {
    raw.map(|v| {
        v.trim().parse::<i32>().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("{v:?}: {e}"),
        })
    })
    .transpose()
}
