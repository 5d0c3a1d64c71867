//! llmcompare - side-by-side comparison of local language models
//!
//! This library sends one prompt to several models served by a local Ollama
//! instance, stores every answer together with its timing metrics, and
//! exports the collected results as tab-separated values.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `coordinator`: Run orchestration, model selection, and run events
//! - `providers`: Model backend abstraction and the Ollama implementation
//! - `storage`: Append-only SQLite response store
//! - `export`: Cached result view and TSV rendering
//! - `commands`: Handlers behind each CLI command
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use llmcompare::{Config, RunCoordinator};
//! use llmcompare::providers::create_provider;
//! use llmcompare::storage::SqliteStorage;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.backend)?;
//!     let store = Arc::new(SqliteStorage::from_config(&config.storage)?);
//!     let mut coordinator = RunCoordinator::new(provider, store);
//!     coordinator.initialize().await?;
//!     coordinator.select_all();
//!
//!     let selection = coordinator.selection();
//!     coordinator.submit_prompt("Hello", &selection).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{RunCoordinator, RunEvent, RunReport, RunState, Selection};
pub use error::{LlmCompareError, Result};
pub use export::ResultView;

#[cfg(test)]
pub mod test_utils;
