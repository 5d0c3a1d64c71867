//! Ollama provider implementation for llmcompare
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server to list installed models and request non-streaming
//! chat completions together with their timing metrics.

use crate::config::OllamaConfig;
use crate::error::{LlmCompareError, Result};
use crate::providers::{ChatCompletion, ChatMessage, ModelDescriptor, Provider, ResponseMetrics};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use llmcompare::config::OllamaConfig;
/// use llmcompare::providers::{ChatMessage, OllamaProvider, Provider};
///
/// # async fn example() -> llmcompare::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let models = provider.list_models().await?;
/// let completion = provider
///     .chat(&models[0].name, &[ChatMessage::user("Hello!")])
///     .await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Response from Ollama's /api/tags endpoint
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

/// Model metadata from /api/tags
#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    details: OllamaModelDetails,
}

/// Model details embedded in /api/tags entries
#[derive(Debug, Deserialize, Default)]
struct OllamaModelDetails {
    #[serde(default)]
    parameter_size: String,
    #[serde(default)]
    family: String,
}

/// Request structure for /api/chat
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Message structure returned by /api/chat
#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Response structure from /api/chat
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    total_duration: u64,
    #[serde(default)]
    load_duration: u64,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    prompt_eval_duration: u64,
    #[serde(default)]
    eval_count: u64,
    #[serde(default)]
    eval_duration: u64,
}

impl From<OllamaModelTag> for ModelDescriptor {
    fn from(tag: OllamaModelTag) -> Self {
        // Older servers omit details; fall back to the name stem as family
        let family = if tag.details.family.is_empty() {
            tag.name.split(':').next().unwrap_or(&tag.name).to_string()
        } else {
            tag.details.family
        };
        ModelDescriptor::new(tag.name, tag.details.parameter_size, tag.size, family)
    }
}

impl OllamaChatResponse {
    fn into_completion(self) -> ChatCompletion {
        let created_at = self.created_at.unwrap_or_else(|| {
            tracing::debug!("Ollama response missing created_at, using local time");
            Utc::now()
        });

        ChatCompletion {
            content: self.message.content,
            created_at,
            metrics: ResponseMetrics {
                total_duration: self.total_duration,
                load_duration: self.load_duration,
                prompt_eval_count: self.prompt_eval_count,
                prompt_eval_duration: self.prompt_eval_duration,
                eval_count: self.eval_count,
                eval_duration: self.eval_duration,
            },
        }
    }
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use llmcompare::config::OllamaConfig;
    /// use llmcompare::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("llmcompare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LlmCompareError::Http)?;

        tracing::info!(
            "Initialized Ollama provider: host={}, timeout={}s",
            config.host,
            config.request_timeout_seconds
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let url = self.endpoint("/api/tags");
        tracing::debug!("Fetching models from Ollama: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Failed to fetch Ollama models: {}", e);
            LlmCompareError::BackendUnavailable(format!(
                "Failed to connect to Ollama server: {}",
                e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(LlmCompareError::BackendUnavailable(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let tags: OllamaTagsResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama tags response: {}", e);
            LlmCompareError::BackendUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        let models: Vec<ModelDescriptor> = tags.models.into_iter().map(Into::into).collect();
        tracing::debug!("Fetched {} models from Ollama", models.len());
        Ok(models)
    }

    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion> {
        let url = self.endpoint("/api/chat");
        let request = OllamaChatRequest {
            model,
            messages,
            stream: false,
        };

        tracing::debug!(
            "Sending Ollama chat request: model={}, {} messages",
            model,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request for {} failed: {}", model, e);
                LlmCompareError::BackendUnavailable(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {} for {}: {}", status, model, error_text);
            return Err(LlmCompareError::BackendUnavailable(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let chat_response: OllamaChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama chat response: {}", e);
            LlmCompareError::BackendUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: model={}, prompt_tokens={}, completion_tokens={}",
            model,
            chat_response.prompt_eval_count,
            chat_response.eval_count
        );

        Ok(chat_response.into_completion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new(OllamaConfig::default());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_ollama_provider_host() {
        let provider = OllamaProvider::new(OllamaConfig::default()).unwrap();
        assert_eq!(provider.host(), "http://localhost:11434");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let provider = OllamaProvider::new(config).unwrap();
        assert_eq!(
            provider.endpoint("/api/tags"),
            "http://localhost:11434/api/tags"
        );
    }

    #[test]
    fn test_parse_tags_response() {
        let json = r#"{
            "models": [{
                "name": "llama3:8b",
                "model": "llama3:8b",
                "modified_at": "2024-05-01T10:00:00Z",
                "size": 4661224676,
                "digest": "365c0bd3c000",
                "details": {
                    "format": "gguf",
                    "family": "llama",
                    "families": ["llama"],
                    "parameter_size": "8.0B",
                    "quantization_level": "Q4_0"
                }
            }]
        }"#;

        let tags: OllamaTagsResponse = serde_json::from_str(json).unwrap();
        let models: Vec<ModelDescriptor> = tags.models.into_iter().map(Into::into).collect();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "llama3:8b");
        assert_eq!(models[0].family, "llama");
        assert_eq!(models[0].parameter_size, "8.0B");
        assert_eq!(models[0].size_bytes, 4_661_224_676);
        assert!(!models[0].selected);
    }

    #[test]
    fn test_tag_without_details_derives_family_from_name() {
        let tag: OllamaModelTag =
            serde_json::from_str(r#"{"name": "phi3:mini", "size": 10}"#).unwrap();
        let model = ModelDescriptor::from(tag);
        assert_eq!(model.family, "phi3");
        assert_eq!(model.parameter_size, "");
    }

    #[test]
    fn test_parse_chat_response_metrics() {
        let json = r#"{
            "model": "llama3:8b",
            "created_at": "2024-05-01T12:30:45.123456789Z",
            "message": { "role": "assistant", "content": "Hi there" },
            "done": true,
            "total_duration": 5191566416,
            "load_duration": 2154458,
            "prompt_eval_count": 26,
            "prompt_eval_duration": 383809000,
            "eval_count": 298,
            "eval_duration": 4799921000
        }"#;

        let response: OllamaChatResponse = serde_json::from_str(json).unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.content, "Hi there");
        assert_eq!(
            completion.created_at.to_rfc3339(),
            "2024-05-01T12:30:45.123456789+00:00"
        );
        assert_eq!(completion.metrics.total_duration, 5_191_566_416);
        assert_eq!(completion.metrics.load_duration, 2_154_458);
        assert_eq!(completion.metrics.prompt_eval_count, 26);
        assert_eq!(completion.metrics.prompt_eval_duration, 383_809_000);
        assert_eq!(completion.metrics.eval_count, 298);
        assert_eq!(completion.metrics.eval_duration, 4_799_921_000);
    }

    #[test]
    fn test_parse_chat_response_missing_metrics_default_to_zero() {
        let json = r#"{ "message": { "role": "assistant", "content": "" } }"#;
        let response: OllamaChatResponse = serde_json::from_str(json).unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.metrics, ResponseMetrics::default());
    }

    #[test]
    fn test_chat_request_serialization() {
        let messages = vec![ChatMessage::user("Hello")];
        let request = OllamaChatRequest {
            model: "mistral:7b",
            messages: &messages,
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "mistral:7b");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hello");
    }
}
