//! Provider module for llmcompare
//!
//! This module contains the model backend abstraction and its Ollama
//! implementation.

pub mod base;
pub mod ollama;

pub use base::{ChatCompletion, ChatMessage, ModelDescriptor, Provider, ResponseMetrics};
pub use ollama::OllamaProvider;

use crate::config::OllamaConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the backend provider from configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_provider(config: &OllamaConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(OllamaProvider::new(config.clone())?))
}
