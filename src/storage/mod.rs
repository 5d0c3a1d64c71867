use crate::config::StorageConfig;
use crate::error::{LlmCompareError, Result};
use crate::providers::ResponseMetrics;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{ResponseRecord, RunSummary};

/// Append-only collection of response records
///
/// The run coordinator writes through this trait and the result view reads
/// through it; neither needs update or delete.
pub trait ResponseStore: Send + Sync {
    /// Append one record and return it with its assigned id
    fn append(&self, record: &ResponseRecord) -> Result<ResponseRecord>;

    /// Return every stored record in insertion order
    fn load_all(&self) -> Result<Vec<ResponseRecord>>;
}

const SELECT_COLUMNS: &str = "SELECT id, run_id, model_name, model_family, parameter_size,
    model_size, query, response, total_duration, load_duration, prompt_eval_count,
    prompt_eval_duration, eval_count, eval_duration, created_at, started_at
    FROM responses";

/// SQLite-backed response storage
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory, unless
    /// `LLMCOMPARE_HISTORY_DB` points somewhere else.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("LLMCOMPARE_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "llmcompare", "llmcompare").ok_or_else(|| {
            LlmCompareError::Storage("Could not determine data directory".into())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        let storage = Self {
            db_path: data_dir.join("responses.db"),
        };
        storage.init()?;

        Ok(storage)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use llmcompare::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("responses.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| LlmCompareError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open the storage described by the configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match &config.db_path {
            Some(path) => Self::new_with_path(path.clone()),
            None => Self::new(),
        }
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| LlmCompareError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                model_name TEXT NOT NULL,
                model_family TEXT NOT NULL,
                parameter_size TEXT NOT NULL,
                model_size INTEGER NOT NULL,
                query TEXT NOT NULL,
                response TEXT NOT NULL,
                total_duration INTEGER NOT NULL,
                load_duration INTEGER NOT NULL,
                prompt_eval_count INTEGER NOT NULL,
                prompt_eval_duration INTEGER NOT NULL,
                eval_count INTEGER NOT NULL,
                eval_duration INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                started_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_responses_run_id ON responses (run_id);",
        )
        .context("Failed to create tables")
        .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Load every record of one run (supports full UUID or a unique prefix)
    ///
    /// # Errors
    ///
    /// Returns `InvalidRunId` for an empty identifier and `AmbiguousRunId`
    /// when the prefix matches more than one run
    pub fn load_run(&self, run_id: &str) -> Result<Vec<ResponseRecord>> {
        let run_id = run_id.trim();
        if run_id.is_empty() {
            return Err(LlmCompareError::InvalidRunId(run_id.to_string()).into());
        }

        let conn = self.open()?;

        // substr compares literally, so '%' and '_' in the prefix match themselves
        let sql = format!(
            "{} WHERE substr(run_id, 1, ?1) = ?2 ORDER BY id",
            SELECT_COLUMNS
        );
        let prefix_len = i64::try_from(run_id.chars().count()).unwrap_or(i64::MAX);
        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare statement")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        let records = stmt
            .query_map(params![prefix_len, run_id], record_from_row)
            .context("Failed to query run")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read run records")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        if let Some(first) = records.first() {
            if records.iter().any(|r| r.run_id != first.run_id) {
                return Err(LlmCompareError::AmbiguousRunId(run_id.to_string()).into());
            }
        }

        Ok(records)
    }

    /// List recorded runs, most recent first
    pub fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT run_id, MIN(query), MIN(started_at), COUNT(*)
                FROM responses
                GROUP BY run_id
                ORDER BY MIN(started_at) DESC, MIN(id) DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        let runs = stmt
            .query_map([], |row| {
                let started_at_str: String = row.get(2)?;
                let count: i64 = row.get(3)?;
                Ok(RunSummary {
                    run_id: row.get(0)?,
                    query: row.get(1)?,
                    started_at: parse_timestamp(2, &started_at_str)?,
                    response_count: usize::try_from(count).unwrap_or(0),
                })
            })
            .context("Failed to query runs")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read runs")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        Ok(runs)
    }
}

impl ResponseStore for SqliteStorage {
    fn append(&self, record: &ResponseRecord) -> Result<ResponseRecord> {
        let m = &record.metrics;
        let model_size = to_sql_int("model_size", record.model_size)?;
        let total_duration = to_sql_int("total_duration", m.total_duration)?;
        let load_duration = to_sql_int("load_duration", m.load_duration)?;
        let prompt_eval_count = to_sql_int("prompt_eval_count", m.prompt_eval_count)?;
        let prompt_eval_duration = to_sql_int("prompt_eval_duration", m.prompt_eval_duration)?;
        let eval_count = to_sql_int("eval_count", m.eval_count)?;
        let eval_duration = to_sql_int("eval_duration", m.eval_duration)?;

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO responses (
                run_id, model_name, model_family, parameter_size, model_size, query, response,
                total_duration, load_duration, prompt_eval_count, prompt_eval_duration,
                eval_count, eval_duration, created_at, started_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.run_id,
                record.model_name,
                record.model_family,
                record.parameter_size,
                model_size,
                record.query,
                record.response,
                total_duration,
                load_duration,
                prompt_eval_count,
                prompt_eval_duration,
                eval_count,
                eval_duration,
                format_timestamp(&record.created_at),
                format_timestamp(&record.started_at),
            ],
        )
        .context("Failed to insert response")
        .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        let mut stored = record.clone();
        stored.id = Some(conn.last_insert_rowid());
        tracing::debug!(
            id = conn.last_insert_rowid(),
            run.id = %record.run_id,
            run.model = %record.model_name,
            "Stored response"
        );
        Ok(stored)
    }

    fn load_all(&self) -> Result<Vec<ResponseRecord>> {
        let conn = self.open()?;

        let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare statement")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        let records = stmt
            .query_map([], record_from_row)
            .context("Failed to query responses")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read responses")
            .map_err(|e| LlmCompareError::Storage(e.to_string()))?;

        Ok(records)
    }
}

/// Nanosecond precision keeps the stored text lossless and sortable
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// SQLite integers are signed 64-bit; larger values are rejected, not clamped
fn to_sql_int(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        LlmCompareError::Storage(format!(
            "{} value {} exceeds the SQLite INTEGER range",
            field, value
        ))
        .into()
    })
}

fn from_sql_int(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ResponseRecord> {
    let created_at: String = row.get(14)?;
    let started_at: String = row.get(15)?;

    Ok(ResponseRecord {
        id: Some(row.get(0)?),
        run_id: row.get(1)?,
        model_name: row.get(2)?,
        model_family: row.get(3)?,
        parameter_size: row.get(4)?,
        model_size: from_sql_int(row, 5)?,
        query: row.get(6)?,
        response: row.get(7)?,
        metrics: ResponseMetrics {
            total_duration: from_sql_int(row, 8)?,
            load_duration: from_sql_int(row, 9)?,
            prompt_eval_count: from_sql_int(row, 10)?,
            prompt_eval_duration: from_sql_int(row, 11)?,
            eval_count: from_sql_int(row, 12)?,
            eval_duration: from_sql_int(row, 13)?,
        },
        created_at: parse_timestamp(14, &created_at)?,
        started_at: parse_timestamp(15, &started_at)?,
    })
}
