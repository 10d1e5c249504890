use std::path::Path;

use anyhow::Context;

use socks_app::AppConfig;
use socks_infra::{CsvSheet, ImportError, TabularSource, WorkbookSheet};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    socks_observability::init_with_default(&config.log_filter);

    let service = socks_app::in_memory();

    if let Some(path) = &config.batch_file {
        let mut sheet = open_batch(path)?;
        let imported = service
            .import_batch(sheet.as_mut())
            .with_context(|| format!("batch import from {} failed", path.display()))?;
        tracing::info!(imported, "startup batch imported");
    } else {
        tracing::warn!("SOCKS_BATCH_FILE not set; store starts empty");
    }

    service.refresh_snapshot()?;

    if let Some(path) = &config.snapshot_csv {
        service
            .load_snapshot_csv(path)
            .with_context(|| format!("snapshot load from {} failed", path.display()))?;
    }

    let result = service.filter_stock(&config.query)?;
    tracing::info!(matches = result.len(), query = ?config.query, "stock query evaluated");
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Workbooks by extension, anything else as comma-delimited text.
fn open_batch(path: &Path) -> Result<Box<dyn TabularSource>, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    Ok(match extension.as_deref() {
        Some("xlsx" | "xlsm" | "xls" | "ods") => Box::new(WorkbookSheet::from_path(path)?),
        _ => Box::new(CsvSheet::from_path(path)?),
    })
}
