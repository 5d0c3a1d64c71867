//! Command handlers for the CLI
//!
//! Each submodule backs one top-level command:
//!
//! - `models`: list the models installed on the backend
//! - `run`: send a prompt to several models and record the answers
//! - `history`: browse recorded runs
//! - `export`: write every stored response as TSV

use crate::config::Config;
use crate::error::Result;
use crate::storage::SqliteStorage;
use std::sync::Arc;

pub mod export;
pub mod history;
pub mod models;
pub mod run;

/// Open the response store described by the configuration
pub(crate) fn open_storage(config: &Config) -> Result<Arc<SqliteStorage>> {
    let storage = SqliteStorage::from_config(&config.storage)?;
    tracing::debug!("Using response database at {}", storage.db_path().display());
    Ok(Arc::new(storage))
}

/// Serialize a serializable value into pretty JSON string.
pub(crate) fn serialize_pretty<T: serde::Serialize + ?Sized>(
    value: &T,
) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Shorten `text` to at most `max` characters for table display
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let single_line = crate::export::sanitize(text);
    if single_line.chars().count() > max {
        let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        single_line
    }
}

/// First 8 characters of a run identifier
pub(crate) fn short_id(run_id: &str) -> &str {
    run_id.get(..8).unwrap_or(run_id)
}
