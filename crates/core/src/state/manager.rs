//! Session coordinator for one pipeline.
//!
//! The StateManager owns the shared [`PipelineState`], the [`AgentRunner`]
//! and the [`KeyRing`], and translates front-end [`Op`]s into state changes
//! and [`Event`]s. Runs are spawned in the background so edits stay
//! possible while a model call is in flight.

use crate::agents::base::ModelInvoker;
use crate::credentials::KeyRing;
use crate::document::{DocumentExtractor, ExtractError};
use crate::engine::{missing_credential, AgentRunner};
use crate::state::pipeline::PipelineState;
use crate::state::process::RunError;
use anyhow::Result;
use ar_protocol::{
    AgentConfig, Event, MetricsSummary, Op, PipelineSnapshot, Provider, RunMetric, RunStatus,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Coordinates edits, runs and credentials for a single pipeline.
pub struct StateManager {
    /// The pipeline itself, shared with the runner.
    state: Arc<Mutex<PipelineState>>,

    runner: Arc<AgentRunner>,

    key_ring: Arc<Mutex<KeyRing>>,

    /// Channel for sending events to the front end.
    events_tx: mpsc::Sender<Event>,
}

impl StateManager {
    /// Create a new StateManager.
    ///
    /// # Arguments
    ///
    /// * `state` - Initial pipeline
    /// * `invoker` - Text generator used for every run
    /// * `key_ring` - Provider credentials
    /// * `events_tx` - Channel for sending events to the front end
    pub fn new(
        state: PipelineState,
        invoker: Arc<dyn ModelInvoker>,
        key_ring: KeyRing,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        let state = Arc::new(Mutex::new(state));
        let runner = Arc::new(AgentRunner::new(Arc::clone(&state), invoker));

        Self {
            state,
            runner,
            key_ring: Arc::new(Mutex::new(key_ring)),
            events_tx,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.runner.status()
    }

    /// A copy of the full pipeline, tagged with the current run status.
    pub async fn snapshot(&self) -> PipelineSnapshot {
        let status = self.status();
        self.state.lock().await.snapshot(status)
    }

    /// Aggregates over the run log.
    pub async fn metrics_summary(&self) -> MetricsSummary {
        MetricsSummary::from(self.state.lock().await.metrics())
    }

    /// Credentialed providers that have no credential yet.
    pub async fn missing_providers(&self) -> Vec<Provider> {
        let key_ring = self.key_ring.lock().await;
        Provider::CREDENTIALED
            .into_iter()
            .filter(|provider| !key_ring.credentials().has(*provider))
            .collect()
    }

    /// The provider whose credential the agent at `position` lacks, if any.
    ///
    /// Front ends call this before a run to offer the operator a chance to
    /// supply the key. Returns `None` for an out-of-range position.
    pub async fn missing_credential(&self, position: usize) -> Option<Provider> {
        let agent = self.state.lock().await.agent(position).cloned()?;
        let key_ring = self.key_ring.lock().await;
        missing_credential(&agent, key_ring.credentials())
    }

    /// Replace the document text with text extracted from `path`.
    ///
    /// The existing text is kept if extraction fails.
    ///
    /// # Returns
    ///
    /// The length in characters of the new document text.
    ///
    /// # Errors
    ///
    /// Returns the extractor's error unchanged.
    pub async fn load_document(
        &self,
        extractor: &dyn DocumentExtractor,
        path: &Path,
    ) -> Result<usize, ExtractError> {
        let credentials = self.key_ring.lock().await.credentials().clone();
        let text = extractor.extract(path, &credentials).await?;
        let length = text.chars().count();
        self.state.lock().await.set_document_text(text);
        tracing::info!("loaded document {} ({} chars)", path.display(), length);
        let _ = self.events_tx.send(Event::DocumentUpdated { length }).await;
        Ok(length)
    }

    /// Run the agent at `position` and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Busy`] if another run is in flight.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub async fn run_agent(&self, position: usize) -> Result<RunMetric, RunError> {
        let credentials = self.key_ring.lock().await.credentials().clone();
        self.runner
            .run_agent(position, credentials, &self.events_tx)
            .await
    }

    /// Start a run of the agent at `position` in the background.
    ///
    /// The run slot is claimed before this returns, so a second call made
    /// right after is rejected deterministically. The position is checked
    /// after the slot is claimed, and removals are refused while it is held,
    /// so the agent cannot disappear before the run reads it.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Busy`] if another run is in flight, or
    /// [`RunError::NoAgent`] if `position` is out of range.
    pub async fn spawn_run(&self, position: usize) -> Result<JoinHandle<RunMetric>, RunError> {
        let ticket = self.runner.begin(position)?;
        if self.state.lock().await.agent(position).is_none() {
            return Err(RunError::NoAgent { position });
        }

        let credentials = self.key_ring.lock().await.credentials().clone();
        let runner = Arc::clone(&self.runner);
        let events_tx = self.events_tx.clone();

        Ok(tokio::spawn(async move {
            runner.execute(ticket, credentials, &events_tx).await
        }))
    }

    /// Apply a single operation from the front end.
    ///
    /// Out-of-range positions are rejected with an event instead of
    /// panicking, since they come from outside the process.
    ///
    /// # Returns
    ///
    /// `false` once the session should end.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential change cannot be persisted.
    pub async fn handle(&self, op: Op) -> Result<bool> {
        match op {
            Op::AddAgent => {
                let (position, name) = {
                    let mut state = self.state.lock().await;
                    let position = state.editor().add_agent();
                    (position, state.agents()[position].name.clone())
                };
                self.emit(Event::AgentAdded { position, name }).await;
            }
            Op::RemoveAgent { position } => {
                let removed = {
                    // the run status is read under the state lock so a run
                    // cannot validate its position in between
                    let mut state = self.state.lock().await;
                    if self.status().is_running() {
                        Err("cannot remove an agent while a run is in flight".to_string())
                    } else if position < state.len() {
                        Ok(state.editor().remove_agent(position))
                    } else {
                        Err(format!("no agent at position {}", position))
                    }
                };
                match removed {
                    Ok((agent, _)) => {
                        tracing::debug!("removed '{}' at position {}", agent.name, position);
                        self.emit(Event::AgentRemoved { position }).await;
                    }
                    Err(reason) => self.reject_edit(&reason).await,
                }
            }
            Op::EditAgent { position, field } => {
                let key = field.key().to_string();
                let edited = self
                    .with_agent(position, |state| state.editor().edit_field(position, field))
                    .await;
                if edited {
                    self.emit(Event::AgentEdited { position, field: key }).await;
                }
            }
            Op::SetInput { position, text } => {
                let edited = self
                    .with_agent(position, |state| state.editor().set_input(position, text))
                    .await;
                if edited {
                    self.emit(Event::InputEdited { position }).await;
                }
            }
            Op::SetDocumentText { text } => {
                let length = text.chars().count();
                self.state.lock().await.set_document_text(text);
                self.emit(Event::DocumentUpdated { length }).await;
            }
            Op::RunAgent { position } => {
                if let Err(err) = self.spawn_run(position).await {
                    tracing::warn!("run of position {} refused: {}", position, err);
                    self.emit(Event::RunRejected {
                        position,
                        reason: err.to_string(),
                    })
                    .await;
                }
            }
            Op::SetCredential { provider, secret } => {
                let present = {
                    let mut key_ring = self.key_ring.lock().await;
                    key_ring.set(provider, secret)?;
                    key_ring.credentials().has(provider)
                };
                self.emit(Event::CredentialUpdated { provider, present }).await;
            }
            Op::GetSnapshot => {
                let snapshot = self.snapshot().await;
                self.emit(Event::Snapshot { snapshot }).await;
            }
            Op::Shutdown => return Ok(false),
        }
        Ok(true)
    }

    /// Agents currently configured, in order.
    pub async fn agents(&self) -> Vec<AgentConfig> {
        self.state.lock().await.agents().to_vec()
    }

    async fn with_agent(&self, position: usize, edit: impl FnOnce(&mut PipelineState)) -> bool {
        let applied = {
            let mut state = self.state.lock().await;
            let in_range = position < state.len();
            if in_range {
                edit(&mut state);
            }
            in_range
        };
        if !applied {
            self.reject_out_of_range(position).await;
        }
        applied
    }

    async fn reject_out_of_range(&self, position: usize) {
        self.reject_edit(&format!("no agent at position {}", position))
            .await;
    }

    async fn reject_edit(&self, reason: &str) {
        tracing::warn!("edit refused: {}", reason);
        self.emit(Event::EditRejected {
            reason: reason.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }
}
