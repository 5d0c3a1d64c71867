//! Command-line interface definition for llmcompare
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for model discovery, comparison runs, history
//! browsing, and export.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// llmcompare - compare local language models side by side
///
/// Sends one prompt to several models served by a local Ollama instance,
/// records each answer with its timing metrics, and exports the results.
#[derive(Parser, Debug, Clone)]
#[command(name = "llmcompare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to config/config.yaml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the response database location
    ///
    /// Takes precedence over `LLMCOMPARE_HISTORY_DB` and the config file.
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for llmcompare
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the models installed on the backend
    Models {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one prompt to several models and record their answers
    Run {
        /// Prompt text sent to every selected model
        #[arg(short, long)]
        prompt: String,

        /// Model to include in the run (repeatable)
        #[arg(short, long = "model", required_unless_present = "all")]
        models: Vec<String>,

        /// Include every installed model
        #[arg(long, conflicts_with = "models")]
        all: bool,

        /// Output the recorded responses as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse recorded runs
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Export every recorded response as tab-separated values
    Export {
        /// Destination file (defaults to export.file_name from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List recorded runs, most recent first
    List,

    /// Show every response recorded for one run
    Show {
        /// Run identifier (full UUID or a prefix matching exactly one run)
        run_id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            storage_path: None,
            command: Commands::Models { json: false },
        }
    }
}
