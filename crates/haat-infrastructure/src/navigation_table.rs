//! Loads the page navigation table from TOML.
//!
//! ```toml
//! [[page]]
//! phrase = "my orders"
//! route = "/orders"
//! ```

use std::path::Path;

use haat_core::error::{HaatError, Result};
use haat_core::navigation::NavigationTable;

/// Reads and parses a navigation table file. Entry order is preserved.
pub async fn load_navigation_table(path: &Path) -> Result<NavigationTable> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        HaatError::config(format!(
            "Failed to read navigation table {}: {}",
            path.display(),
            e
        ))
    })?;
    let table: NavigationTable = toml::from_str(&content)?;

    tracing::info!(
        path = %path.display(),
        entries = table.len(),
        "Loaded navigation table"
    );
    Ok(table)
}

/// Loads the configured table, or the built-in one when `path` is `None`.
pub async fn load_or_builtin(path: Option<&Path>) -> Result<NavigationTable> {
    match path {
        Some(path) => load_navigation_table(path).await,
        None => Ok(NavigationTable::builtin()),
    }
}
