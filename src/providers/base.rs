//! Base provider trait and common types
//!
//! This module defines the backend abstraction the run coordinator talks to,
//! together with the model and completion types it exchanges.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about one locally available language model
///
/// The `selected` flag only lives while a run is being composed; it is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique model identifier (e.g. "llama3:8b")
    pub name: String,
    /// Parameter count as reported by the backend (e.g. "8.0B")
    pub parameter_size: String,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// Model family (e.g. "llama")
    pub family: String,
    /// Whether the model takes part in the next run
    #[serde(skip)]
    pub selected: bool,
}

impl ModelDescriptor {
    /// Create an unselected descriptor
    ///
    /// # Examples
    ///
    /// ```
    /// use llmcompare::providers::ModelDescriptor;
    ///
    /// let model = ModelDescriptor::new("llama3:8b", "8.0B", 4_661_224_676, "llama");
    /// assert!(!model.selected);
    /// ```
    pub fn new(
        name: impl Into<String>,
        parameter_size: impl Into<String>,
        size_bytes: u64,
        family: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_size: parameter_size.into(),
            size_bytes,
            family: family.into(),
            selected: false,
        }
    }
}

/// A single chat message sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author ("user", "assistant", "system")
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Timing and usage metrics reported with a completion
///
/// Durations are in nanoseconds; counts are token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetrics {
    /// Wall time spent by the backend on the whole request
    pub total_duration: u64,
    /// Time spent loading the model
    pub load_duration: u64,
    /// Number of prompt tokens evaluated
    pub prompt_eval_count: u64,
    /// Time spent evaluating the prompt
    pub prompt_eval_duration: u64,
    /// Number of tokens generated
    pub eval_count: u64,
    /// Time spent generating the response
    pub eval_duration: u64,
}

/// A settled chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Generated response text
    pub content: String,
    /// Creation time reported by the backend
    pub created_at: DateTime<Utc>,
    /// Timing and usage metrics
    pub metrics: ResponseMetrics,
}

/// Model-serving backend
///
/// The run coordinator only needs two operations: discover the installed
/// models and ask one of them for a chat completion.
///
/// # Examples
///
/// ```
/// use llmcompare::providers::{ChatCompletion, ChatMessage, ModelDescriptor, Provider};
/// use llmcompare::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
///         Ok(vec![ModelDescriptor::new("echo", "1B", 1, "echo")])
///     }
///
///     async fn chat(&self, _model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion> {
///         Ok(ChatCompletion {
///             content: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
///             created_at: chrono::Utc::now(),
///             metrics: Default::default(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// List the models installed on the backend
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the backend cannot be reached or
    /// answers with an error
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>>;

    /// Request a non-streaming chat completion from one model
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the request fails or the response
    /// cannot be parsed
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion>;
}
