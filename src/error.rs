//! Error types for llmcompare
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for llmcompare operations
///
/// Every variant is recoverable at the operation boundary. None of them
/// should terminate a run that is already in flight.
#[derive(Error, Debug)]
pub enum LlmCompareError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model backend could not be reached or answered with an error
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Response storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A run lookup was given an empty identifier
    #[error("Invalid run id: '{0}'")]
    InvalidRunId(String),

    /// A run id prefix matched more than one run
    #[error("Ambiguous run id '{0}': more than one run matches, use a longer prefix")]
    AmbiguousRunId(String),

    /// Export requested while no responses are stored
    #[error("Nothing to export: no responses have been recorded yet")]
    EmptyExport,

    /// Throughput requested for a zero duration
    #[error("Cannot compute throughput for a zero duration")]
    ZeroDuration,

    /// A run was submitted without any selected model
    #[error("No models selected for this run")]
    EmptySelection,

    /// A run was submitted with a blank prompt
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    /// The named model is not installed on the backend
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for llmcompare operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need to branch on a specific condition downcast to [`LlmCompareError`].
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = LlmCompareError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_backend_unavailable_display() {
        let error = LlmCompareError::BackendUnavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Backend unavailable: connection refused");
    }

    #[test]
    fn test_storage_error_display() {
        let error = LlmCompareError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_ambiguous_run_id_display() {
        let error = LlmCompareError::AmbiguousRunId("abcdef".to_string());
        assert!(error.to_string().starts_with("Ambiguous run id 'abcdef'"));
    }

    #[test]
    fn test_empty_export_display() {
        let error = LlmCompareError::EmptyExport;
        assert!(error.to_string().starts_with("Nothing to export"));
    }

    #[test]
    fn test_unknown_model_display() {
        let error = LlmCompareError::UnknownModel("phi3:mini".to_string());
        assert_eq!(error.to_string(), "Unknown model: phi3:mini");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: LlmCompareError = io_error.into();
        assert!(matches!(error, LlmCompareError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: LlmCompareError = json_error.into();
        assert!(matches!(error, LlmCompareError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: LlmCompareError = yaml_error.into();
        assert!(matches!(error, LlmCompareError::Yaml(_)));
    }

    #[test]
    fn test_http_error_conversion() {
        let http_error = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let error: LlmCompareError = http_error.into();
        assert!(matches!(error, LlmCompareError::Http(_)));
        assert!(error.to_string().starts_with("HTTP error:"));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let result: Result<()> = Err(LlmCompareError::EmptySelection.into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LlmCompareError>(),
            Some(LlmCompareError::EmptySelection)
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LlmCompareError>();
    }
}
