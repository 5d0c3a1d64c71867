use crate::providers::{ChatCompletion, ModelDescriptor, ResponseMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One model's answer to one prompt, with its metrics
///
/// Records are immutable once written. `id` is `None` until storage
/// assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Auto-incremented storage id
    pub id: Option<i64>,
    /// Identifier shared by every record of one run
    pub run_id: String,
    /// Model that produced the response
    pub model_name: String,
    /// Model family
    pub model_family: String,
    /// Parameter count display string
    pub parameter_size: String,
    /// Model size in bytes
    pub model_size: u64,
    /// Prompt sent to the model
    pub query: String,
    /// Text returned by the model
    pub response: String,
    /// Timing and usage metrics (nanoseconds / token counts)
    pub metrics: ResponseMetrics,
    /// Creation time reported by the backend
    pub created_at: DateTime<Utc>,
    /// Time the run was submitted, observed locally
    pub started_at: DateTime<Utc>,
}

impl ResponseRecord {
    /// Build an unsaved record from a settled completion
    pub fn from_completion(
        run_id: &str,
        model: &ModelDescriptor,
        query: &str,
        completion: ChatCompletion,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            run_id: run_id.to_string(),
            model_name: model.name.clone(),
            model_family: model.family.clone(),
            parameter_size: model.parameter_size.clone(),
            model_size: model.size_bytes,
            query: query.to_string(),
            response: completion.content,
            metrics: completion.metrics,
            created_at: completion.created_at,
            started_at,
        }
    }
}

/// Summary of one recorded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: String,
    /// Prompt of the run
    pub query: String,
    /// When the run was submitted
    pub started_at: DateTime<Utc>,
    /// Number of responses recorded for the run
    pub response_count: usize,
}
