use chrono::{TimeZone, Utc};
use llmcompare::providers::{ModelDescriptor, ResponseMetrics};
use llmcompare::storage::{ResponseRecord, SqliteStorage};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("responses.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn model(name: &str) -> ModelDescriptor {
    let family = name.split(':').next().unwrap_or(name);
    ModelDescriptor::new(name, "7.2B", 4_113_301_824, family)
}

#[allow(dead_code)]
pub fn sample_record(run_id: &str, model_name: &str) -> ResponseRecord {
    ResponseRecord {
        id: None,
        run_id: run_id.to_string(),
        model_name: model_name.to_string(),
        model_family: "llama".to_string(),
        parameter_size: "8.0B".to_string(),
        model_size: 4_661_224_676,
        query: "Hello".to_string(),
        response: "Hi! How can I help?".to_string(),
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
