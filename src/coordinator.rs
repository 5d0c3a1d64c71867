//! Run coordinator
//!
//! This module orchestrates one comparison run:
//! - Discovers the installed models and tracks which ones are selected
//! - Fans a prompt out to every selected model concurrently
//! - Persists each response as it arrives and reports every outcome
//! - Notifies subscribers when the run starts, progresses, and completes

use crate::error::{LlmCompareError, Result};
use crate::providers::{ChatCompletion, ChatMessage, ModelDescriptor, Provider};
use crate::storage::{ResponseRecord, ResponseStore};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Whether a run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in flight; a prompt may be submitted
    Idle,
    /// Requests of the current run are still settling
    Busy,
}

/// Notification emitted to subscribers during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// A run was submitted to the listed models
    RunStarted { run_id: String, models: Vec<String> },
    /// A model answered and its record was stored
    ResponseRecorded { model: String },
    /// The request to a model failed
    RequestFailed { model: String },
    /// A model answered but its record could not be stored
    StorageFailed { model: String },
    /// Every request of the run has settled
    RunComplete,
}

/// Immutable snapshot of the models chosen for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    models: Vec<ModelDescriptor>,
}

impl Selection {
    /// Build a selection from explicit descriptors
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// Selected descriptors, in catalog order
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Names of the selected models
    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// How one request of a run settled
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The response was stored
    Recorded(Box<ResponseRecord>),
    /// The backend call failed; nothing was stored
    RequestFailed { model: String, error: String },
    /// The response arrived but writing it failed
    StorageFailed {
        record: Box<ResponseRecord>,
        error: String,
    },
}

/// A request of a run that did not produce a stored record
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
    /// The backend call failed
    Request { model: String, error: String },
    /// The record was built but not stored
    Storage {
        record: Box<ResponseRecord>,
        error: String,
    },
}

impl RunFailure {
    /// Model the failure belongs to
    pub fn model(&self) -> &str {
        match self {
            RunFailure::Request { model, .. } => model,
            RunFailure::Storage { record, .. } => &record.model_name,
        }
    }

    /// Error message of the failure
    pub fn error(&self) -> &str {
        match self {
            RunFailure::Request { error, .. } | RunFailure::Storage { error, .. } => error,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier shared by every record of the run
    pub run_id: String,
    /// Client-observed submission time
    pub started_at: DateTime<Utc>,
    /// Records written, in completion order
    pub records: Vec<ResponseRecord>,
    /// Requests that did not produce a stored record
    pub failures: Vec<RunFailure>,
}

impl RunReport {
    /// Number of requests issued by the run
    pub fn settled(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Coordinates comparison runs against one backend and one store
///
/// # Examples
///
/// ```no_run
/// use llmcompare::config::Config;
/// use llmcompare::coordinator::RunCoordinator;
/// use llmcompare::providers::create_provider;
/// use llmcompare::storage::SqliteStorage;
/// use std::sync::Arc;
///
/// # async fn example() -> llmcompare::error::Result<()> {
/// let config = Config::default();
/// let provider = create_provider(&config.backend)?;
/// let store = Arc::new(SqliteStorage::from_config(&config.storage)?);
///
/// let mut coordinator = RunCoordinator::new(provider, store);
/// coordinator.initialize().await?;
/// coordinator.toggle_selection("llama3:8b")?;
///
/// let selection = coordinator.selection();
/// let report = coordinator.submit_prompt("Hello", &selection).await?;
/// println!("{} responses recorded", report.records.len());
/// # Ok(())
/// # }
/// ```
pub struct RunCoordinator {
    provider: Arc<dyn Provider>,
    store: Arc<dyn ResponseStore>,
    models: Vec<ModelDescriptor>,
    results: Vec<ResponseRecord>,
    state: RunState,
    subscribers: Vec<mpsc::UnboundedSender<RunEvent>>,
}

impl RunCoordinator {
    /// Create an idle coordinator with an empty model catalog
    pub fn new(provider: Arc<dyn Provider>, store: Arc<dyn ResponseStore>) -> Self {
        Self {
            provider,
            store,
            models: Vec::new(),
            results: Vec::new(),
            state: RunState::Idle,
            subscribers: Vec::new(),
        }
    }

    /// Load the installed models from the backend
    ///
    /// Every descriptor starts unselected. On failure the catalog is left
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the backend cannot list its models
    pub async fn initialize(&mut self) -> Result<&[ModelDescriptor]> {
        self.models.clear();

        let mut models = self.provider.list_models().await?;
        for model in &mut models {
            model.selected = false;
        }

        info!(models.count = models.len(), "Loaded model catalog");
        self.models = models;
        Ok(&self.models)
    }

    /// Installed models with their current selection flags
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Flip the selection flag of one model and return its new value
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` if no installed model has that name
    pub fn toggle_selection(&mut self, model_name: &str) -> Result<bool> {
        let model = self.find_model_mut(model_name)?;
        model.selected = !model.selected;
        debug!(run.model = %model_name, selected = model.selected, "Toggled selection");
        Ok(model.selected)
    }

    /// Mark one model as selected, leaving it selected if it already was
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` if no installed model has that name
    pub fn select(&mut self, model_name: &str) -> Result<()> {
        self.find_model_mut(model_name)?.selected = true;
        Ok(())
    }

    /// Select every installed model
    pub fn select_all(&mut self) {
        for model in &mut self.models {
            model.selected = true;
        }
    }

    /// Snapshot of the currently selected models
    pub fn selection(&self) -> Selection {
        Selection::new(self.models.iter().filter(|m| m.selected).cloned().collect())
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Records stored by this coordinator, in completion order
    pub fn results(&self) -> &[ResponseRecord] {
        &self.results
    }

    /// Register a new event receiver
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send one prompt to every model of `selection` and record the answers
    ///
    /// Requests run concurrently and are processed as they settle. A failed
    /// request or write is reported in the returned [`RunReport`]; it never
    /// stops the other requests, and the run always ends in `Idle` with a
    /// `RunComplete` event.
    ///
    /// # Errors
    ///
    /// Returns `EmptySelection` or `EmptyPrompt` before anything is sent
    pub async fn submit_prompt(&mut self, prompt: &str, selection: &Selection) -> Result<RunReport> {
        if selection.is_empty() {
            return Err(LlmCompareError::EmptySelection.into());
        }
        if prompt.trim().is_empty() {
            return Err(LlmCompareError::EmptyPrompt.into());
        }

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let total = selection.len();

        self.state = RunState::Busy;
        info!(
            run.id = %run_id,
            run.model_count = total,
            "Starting comparison run"
        );
        self.emit(RunEvent::RunStarted {
            run_id: run_id.clone(),
            models: selection.names(),
        });

        let messages = vec![ChatMessage::user(prompt)];
        let mut pending: FuturesUnordered<_> = selection
            .models()
            .iter()
            .map(|model| {
                let provider = Arc::clone(&self.provider);
                let messages = &messages;
                async move {
                    let result = provider.chat(&model.name, messages).await;
                    (model, result)
                }
            })
            .collect();

        let mut report = RunReport {
            run_id: run_id.clone(),
            started_at,
            records: Vec::with_capacity(total),
            failures: Vec::new(),
        };
        let mut settled = 0usize;

        while let Some((model, result)) = pending.next().await {
            let outcome = self.settle(&run_id, model, prompt, started_at, result);
            settled += 1;

            match outcome {
                RunOutcome::Recorded(record) => {
                    self.emit(RunEvent::ResponseRecorded {
                        model: record.model_name.clone(),
                    });
                    self.results.push((*record).clone());
                    report.records.push(*record);
                }
                RunOutcome::RequestFailed { model, error } => {
                    self.emit(RunEvent::RequestFailed {
                        model: model.clone(),
                    });
                    report.failures.push(RunFailure::Request { model, error });
                }
                RunOutcome::StorageFailed { record, error } => {
                    self.emit(RunEvent::StorageFailed {
                        model: record.model_name.clone(),
                    });
                    report.failures.push(RunFailure::Storage { record, error });
                }
            }

            debug!(run.id = %run_id, run.settled = settled, run.total = total, "Request settled");
        }

        self.state = RunState::Idle;
        info!(
            run.id = %run_id,
            run.recorded = report.records.len(),
            run.failed = report.failures.len(),
            "Comparison run complete"
        );
        self.emit(RunEvent::RunComplete);

        Ok(report)
    }

    fn settle(
        &self,
        run_id: &str,
        model: &ModelDescriptor,
        prompt: &str,
        started_at: DateTime<Utc>,
        result: Result<ChatCompletion>,
    ) -> RunOutcome {
        let completion = match result {
            Ok(completion) => completion,
            Err(e) => {
                warn!(run.id = %run_id, run.model = %model.name, error = %e, "Model request failed");
                return RunOutcome::RequestFailed {
                    model: model.name.clone(),
                    error: format!("{:#}", e),
                };
            }
        };

        let record = ResponseRecord::from_completion(run_id, model, prompt, completion, started_at);
        match self.store.append(&record) {
            Ok(stored) => RunOutcome::Recorded(Box::new(stored)),
            Err(e) => {
                warn!(run.id = %run_id, run.model = %model.name, error = %e, "Failed to store response");
                RunOutcome::StorageFailed {
                    record: Box::new(record),
                    error: format!("{:#}", e),
                }
            }
        }
    }

    fn find_model_mut(&mut self, model_name: &str) -> Result<&mut ModelDescriptor> {
        self.models
            .iter_mut()
            .find(|m| m.name == model_name)
            .ok_or_else(|| LlmCompareError::UnknownModel(model_name.to_string()).into())
    }

    fn emit(&mut self, event: RunEvent) {
        // Closed receivers are dropped silently
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
