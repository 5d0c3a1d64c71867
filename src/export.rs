//! Tabular projection of stored responses
//!
//! [`ResultView`] caches the stored records and renders them as a
//! BOM-prefixed, tab-separated document with one row per response.

use crate::coordinator::RunEvent;
use crate::error::{LlmCompareError, Result};
use crate::storage::{ResponseRecord, ResponseStore};
use chrono::SecondsFormat;
use std::path::Path;
use std::sync::Arc;

/// Byte order mark written at the start of every export
pub const BOM: char = '\u{FEFF}';

/// Column names of the export, in order
pub const EXPORT_HEADER: [&str; 16] = [
    "family",
    "model",
    "parameters",
    "size",
    "query",
    "response",
    "total_duration_ms",
    "load_duration_ms",
    "prompt_eval_count",
    "prompt_eval_duration_ms",
    "prompt_eval_tokens_per_sec",
    "eval_count",
    "eval_duration_ms",
    "eval_tokens_per_sec",
    "created_at",
    "run_id",
];

/// Cached view over every stored response
///
/// # Examples
///
/// ```
/// use llmcompare::export::ResultView;
/// use llmcompare::storage::SqliteStorage;
/// use std::sync::Arc;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Arc::new(SqliteStorage::new_with_path(dir.path().join("responses.db")).unwrap());
/// let view = ResultView::new(store).unwrap();
/// assert!(view.export_all().is_err());
/// ```
pub struct ResultView {
    store: Arc<dyn ResponseStore>,
    records: Vec<ResponseRecord>,
}

impl ResultView {
    /// Create a view and load the current records
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the records cannot be read
    pub fn new(store: Arc<dyn ResponseStore>) -> Result<Self> {
        let mut view = Self {
            store,
            records: Vec::new(),
        };
        view.refresh()?;
        Ok(view)
    }

    /// Reload every record from storage, replacing the cache
    pub fn refresh(&mut self) -> Result<&[ResponseRecord]> {
        self.records = self.store.load_all()?;
        tracing::debug!(records = self.records.len(), "Refreshed result view");
        Ok(&self.records)
    }

    /// React to a coordinator event; returns true if the cache was refreshed
    pub fn apply_event(&mut self, event: &RunEvent) -> Result<bool> {
        match event {
            RunEvent::RunComplete => {
                self.refresh()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Cached records in insertion order
    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    /// Render the cached records as a TSV document
    ///
    /// # Errors
    ///
    /// Returns `EmptyExport` when no records are cached
    pub fn export_all(&self) -> Result<String> {
        if self.records.is_empty() {
            return Err(LlmCompareError::EmptyExport.into());
        }

        let mut out = String::new();
        out.push(BOM);
        out.push_str(&EXPORT_HEADER.join("\t"));
        out.push('\n');
        for record in &self.records {
            out.push_str(&tsv_row(record).join("\t"));
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the TSV document to `path`
    ///
    /// No file is created when there is nothing to export.
    ///
    /// # Errors
    ///
    /// Returns `EmptyExport` when no records are cached, or `Io` if the
    /// file cannot be written
    pub fn write_export(&self, path: &Path) -> Result<usize> {
        let contents = self.export_all()?;
        std::fs::write(path, &contents).map_err(LlmCompareError::Io)?;
        tracing::info!(
            path = %path.display(),
            rows = self.records.len(),
            "Wrote export"
        );
        Ok(self.records.len())
    }
}

/// Project one record into its 16 export cells
pub fn tsv_row(record: &ResponseRecord) -> Vec<String> {
    let m = &record.metrics;
    vec![
        sanitize(&record.model_family),
        sanitize(&record.model_name),
        sanitize(&record.parameter_size),
        format_size(record.model_size),
        sanitize(&record.query),
        sanitize(&record.response),
        duration_ms(m.total_duration).to_string(),
        duration_ms(m.load_duration).to_string(),
        m.prompt_eval_count.to_string(),
        duration_ms(m.prompt_eval_duration).to_string(),
        throughput_cell(m.prompt_eval_count, m.prompt_eval_duration),
        m.eval_count.to_string(),
        duration_ms(m.eval_duration).to_string(),
        throughput_cell(m.eval_count, m.eval_duration),
        record
            .created_at
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        sanitize(&record.run_id),
    ]
}

/// Replace every tab, carriage return, and newline with a single space
pub fn sanitize(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

/// Format byte size for display
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1}{}", size, UNITS[unit_idx])
}

/// Convert nanoseconds to milliseconds
pub fn duration_ms(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000.0
}

/// Tokens per second for `count` tokens over `duration_ns` nanoseconds
///
/// # Errors
///
/// Returns `ZeroDuration` when `duration_ns` is zero
pub fn throughput(count: u64, duration_ns: u64) -> Result<f64> {
    if duration_ns == 0 {
        return Err(LlmCompareError::ZeroDuration.into());
    }
    Ok((count as f64 / duration_ns as f64) * 1e9)
}

fn throughput_cell(count: u64, duration_ns: u64) -> String {
    throughput(count, duration_ns)
        .map(|v| v.to_string())
        .unwrap_or_default()
}
