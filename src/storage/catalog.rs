// src/storage/catalog.rs

//! Catalog state snapshot: load at startup, persist after every cycle.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::models::Page;

/// Load the page catalog. The working snapshot wins when present and
/// parseable; a corrupt working snapshot falls back to the default
/// catalog; with neither file, startup fails.
pub fn load_catalog(config: &StorageConfig) -> Result<Vec<Page>> {
    let working = Path::new(&config.working_catalog);
    let fallback = Path::new(&config.default_catalog);

    if working.exists() {
        match read_catalog(working) {
            Ok(pages) => Ok(pages),
            Err(e) => {
                log::warn!(
                    "Working catalog {} is unreadable ({}); falling back to {}",
                    working.display(),
                    e,
                    fallback.display()
                );
                read_catalog(fallback)
            }
        }
    } else if fallback.exists() {
        read_catalog(fallback)
    } else {
        Err(AppError::config(format!(
            "No catalog found at {} or {}",
            working.display(),
            fallback.display()
        )))
    }
}

fn read_catalog(path: &Path) -> Result<Vec<Page>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist the catalog atomically (write to temp, then rename).
pub async fn save_catalog(path: &Path, pages: &[Page]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(pages)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
