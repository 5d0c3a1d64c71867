//! Export command
//!
//! Writes every stored response to a TSV file. An empty store is reported
//! as a notice and leaves the file system untouched.

use crate::config::Config;
use crate::error::{LlmCompareError, Result};
use crate::export::ResultView;
use colored::Colorize;
use std::path::PathBuf;

use super::open_storage;

/// Export every stored response
///
/// # Arguments
///
/// * `config` - Loaded configuration (storage location, default file name)
/// * `output` - Destination path; `export.file_name` is used when `None`
///
/// # Errors
///
/// Returns an error if storage cannot be read or the file cannot be written.
/// An empty store is not an error.
pub fn export_responses(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    let view = ResultView::new(open_storage(config)?)?;

    match view.write_export(&path) {
        Ok(rows) => {
            println!(
                "{}",
                format!("Exported {} responses to {}", rows, path.display()).green()
            );
            Ok(())
        }
        Err(e)
            if matches!(
                e.downcast_ref::<LlmCompareError>(),
                Some(LlmCompareError::EmptyExport)
            ) =>
        {
            println!(
                "{}",
                "Nothing to export: no responses have been recorded yet.".yellow()
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}
