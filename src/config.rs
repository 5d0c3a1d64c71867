//! Configuration management for llmcompare
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{LlmCompareError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for llmcompare
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model backend settings
    #[serde(default)]
    pub backend: OllamaConfig,

    /// Response storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Ollama backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Upper bound for a single HTTP request (seconds)
    ///
    /// Local models can take minutes to load and answer, so this is generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Response storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Explicit database path; the user data directory is used when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name used when `export` is run without `--output`
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

fn default_export_file_name() -> String {
    "responses.tsv".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LlmCompareError::Config(format!("Failed to read config file: {}", e)))?;
        let config = serde_yaml::from_str(&contents).map_err(LlmCompareError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("LLMCOMPARE_OLLAMA_HOST") {
            tracing::debug!(host = %host, "Env override: LLMCOMPARE_OLLAMA_HOST");
            self.backend.host = host;
        }

        if let Ok(timeout) = std::env::var("LLMCOMPARE_REQUEST_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.backend.request_timeout_seconds = v,
                Err(_) => {
                    tracing::warn!("Invalid LLMCOMPARE_REQUEST_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }

        if let Ok(db_path) = std::env::var("LLMCOMPARE_HISTORY_DB") {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(file_name) = std::env::var("LLMCOMPARE_EXPORT_FILE") {
            self.export.file_name = file_name;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(path) = &cli.storage_path {
            self.storage.db_path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let host = self.backend.host.trim();
        if host.is_empty() {
            return Err(LlmCompareError::Config("backend.host cannot be empty".to_string()).into());
        }

        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(LlmCompareError::Config(format!(
                "backend.host must start with http:// or https://, got: {}",
                host
            ))
            .into());
        }

        if self.backend.request_timeout_seconds == 0 {
            return Err(LlmCompareError::Config(
                "backend.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.export.file_name.trim().is_empty() {
            return Err(
                LlmCompareError::Config("export.file_name cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.host, "http://localhost:11434");
        assert_eq!(config.backend.request_timeout_seconds, 300);
        assert!(config.storage.db_path.is_none());
        assert_eq!(config.export.file_name, "responses.tsv");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_host() {
        let mut config = Config::default();
        config.backend.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_host_without_scheme() {
        let mut config = Config::default();
        config.backend.host = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.backend.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_export_name() {
        let mut config = Config::default();
        config.export.file_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
backend:
  host: http://gpu-box:11434
  request_timeout_seconds: 60
storage:
  db_path: /tmp/llmcompare/responses.db
export:
  file_name: comparison.tsv
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.host, "http://gpu-box:11434");
        assert_eq!(config.backend.request_timeout_seconds, 60);
        assert_eq!(
            config.storage.db_path,
            Some(PathBuf::from("/tmp/llmcompare/responses.db"))
        );
        assert_eq!(config.export.file_name, "comparison.tsv");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "backend:\n  host: http://other:11434\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.host, "http://other:11434");
        assert_eq!(config.backend.request_timeout_seconds, 300);
        assert_eq!(config.export.file_name, "responses.tsv");
    }

    #[test]
    fn test_example_config_parses() {
        let contents =
            std::fs::read_to_string("config/config.yaml").expect("Failed to read config/config.yaml");
        let config: Config = serde_yaml::from_str(&contents).expect("Failed to parse config");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.export.file_name, "responses.tsv");
    }

    #[test]
    fn test_malformed_file_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend: [unclosed\n").unwrap();

        let cli = crate::cli::Cli::default();
        let err = Config::load(path.to_str().unwrap(), &cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LlmCompareError>(),
            Some(LlmCompareError::Yaml(_))
        ));
    }

    #[test]
    #[serial]
    fn test_cli_storage_path_override() {
        let cli = crate::cli::Cli {
            storage_path: Some("/tmp/override.db".to_string()),
            ..Default::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(
            config.storage.db_path,
            Some(PathBuf::from("/tmp/override.db"))
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_backend() {
        std::env::set_var("LLMCOMPARE_OLLAMA_HOST", "http://env-host:11434");
        std::env::set_var("LLMCOMPARE_REQUEST_TIMEOUT_SECONDS", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.backend.host, "http://env-host:11434");
        assert_eq!(config.backend.request_timeout_seconds, 300);

        std::env::remove_var("LLMCOMPARE_OLLAMA_HOST");
        std::env::remove_var("LLMCOMPARE_REQUEST_TIMEOUT_SECONDS");
    }
}
