//! Test utilities for llmcompare
//!
//! This module provides record builders and temporary storage helpers
//! shared by the unit tests.

use crate::providers::ResponseMetrics;
use crate::storage::{ResponseRecord, SqliteStorage};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a storage instance inside a fresh temporary directory
///
/// The directory is returned so it outlives the storage.
pub fn temp_storage() -> (SqliteStorage, TempDir) {
    let dir = temp_dir();
    let storage =
        SqliteStorage::new_with_path(dir.path().join("responses.db")).expect("Failed to open DB");
    (storage, dir)
}

/// Build an unsaved record with realistic metrics
///
/// # Arguments
///
/// * `run_id` - Run identifier for the record
/// * `model` - Model name; the family is taken from the name stem
pub fn sample_record(run_id: &str, model: &str) -> ResponseRecord {
    let family = model.split(':').next().unwrap_or(model).to_string();
    ResponseRecord {
        id: None,
        run_id: run_id.to_string(),
        model_name: model.to_string(),
        model_family: family,
        parameter_size: "8.0B".to_string(),
        model_size: 4_661_224_676,
        query: "Hello".to_string(),
        response: format!("Hello from {}", model),
        metrics: ResponseMetrics {
            total_duration: 5_191_566_416,
            load_duration: 2_154_458,
            prompt_eval_count: 26,
            prompt_eval_duration: 383_809_000,
            eval_count: 298,
            eval_duration: 4_799_921_000,
        },
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap(),
        started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 40).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResponseStore;

    #[test]
    fn test_sample_record_is_unsaved() {
        let record = sample_record("run-1", "mistral:7b");
        assert!(record.id.is_none());
        assert_eq!(record.model_family, "mistral");
    }

    #[test]
    fn test_temp_storage_is_empty() {
        let (storage, _dir) = temp_storage();
        assert!(storage.load_all().unwrap().is_empty());
    }
}
