//! Agent run execution.
//!
//! The [`AgentRunner`] executes exactly one agent per call: it resolves the
//! agent's input, invokes the model, commits the result into the shared
//! [`PipelineState`], and copies the output forward to the next position.
//! There is no automatic cascade; each position is run on request.

use crate::agents::base::{InvocationRequest, InvokeError, ModelInvoker};
use crate::credentials::Credentials;
use crate::state::pipeline::PipelineState;
use crate::state::process::{RunError, RunGate, RunTicket};
use ar_protocol::{AgentConfig, Event, Provider, RunMetric, RunStatus};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Runs single agents against a shared pipeline.
pub struct AgentRunner {
    state: Arc<Mutex<PipelineState>>,
    gate: RunGate,
    invoker: Arc<dyn ModelInvoker>,
}

impl AgentRunner {
    /// Create a runner over `state` that generates text with `invoker`.
    pub fn new(state: Arc<Mutex<PipelineState>>, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            state,
            gate: RunGate::new(),
            invoker,
        }
    }

    pub fn state(&self) -> &Arc<Mutex<PipelineState>> {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.gate.status()
    }

    /// Claim the run slot for `position` without starting the run.
    ///
    /// Lets a caller reserve the slot synchronously and hand the ticket to a
    /// background task.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Busy`] if another run is in flight.
    pub fn begin(&self, position: usize) -> Result<RunTicket, RunError> {
        self.gate.try_begin(position)
    }

    /// Run the agent at `position` and commit its result.
    ///
    /// # Arguments
    ///
    /// * `position` - Index of the agent to run
    /// * `credentials` - Provider credentials visible to the invoker
    /// * `events_tx` - Channel for run events
    ///
    /// # Returns
    ///
    /// The metric appended to the run log.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Busy`] if another run is in flight. Pipeline state
    /// is not touched in that case.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub async fn run_agent(
        &self,
        position: usize,
        credentials: Credentials,
        events_tx: &Sender<Event>,
    ) -> Result<RunMetric, RunError> {
        let ticket = self.begin(position)?;
        Ok(self.execute(ticket, credentials, events_tx).await)
    }

    /// Execute the run reserved by `ticket`.
    ///
    /// The ticket is released only after the result has been committed.
    ///
    /// # Panics
    ///
    /// Panics if the ticket's position is out of range.
    pub async fn execute(
        &self,
        ticket: RunTicket,
        credentials: Credentials,
        events_tx: &Sender<Event>,
    ) -> RunMetric {
        let position = ticket.position();

        let (agent, input) = {
            let state = self.state.lock().await;
            assert!(
                position < state.len(),
                "position {} out of range for pipeline of {} agents",
                position,
                state.len()
            );
            (state.agents()[position].clone(), state.resolve_input(position))
        };

        if let Some(provider) = missing_credential(&agent, &credentials) {
            tracing::warn!(
                "{}; '{}' will receive a substitute result",
                InvokeError::MissingCredential(provider),
                agent.name
            );
            let _ = events_tx
                .send(Event::CredentialMissing { position, provider })
                .await;
        }

        let run_id = Uuid::new_v4();
        tracing::info!("running '{}' at position {} ({})", agent.name, position, agent.model);
        let _ = events_tx.send(Event::RunStarted { run_id, position }).await;

        let request = InvocationRequest::for_agent(&agent, &input).with_credentials(credentials);
        let started = Instant::now();
        let result = self.invoker.invoke(&request).await;
        let elapsed = started.elapsed();
        if result.is_error() {
            tracing::warn!("'{}' at position {} failed: {}", agent.name, position, result.text);
        }

        let metric = {
            let mut state = self.state.lock().await;
            state.commit_run(position, &agent, result, elapsed, run_id)
        };
        drop(ticket);

        tracing::info!(
            "'{}' finished in {:.2}s with {} tokens via {}",
            metric.agent,
            metric.latency_seconds,
            metric.token_count,
            metric.provider_label
        );
        let _ = events_tx
            .send(Event::RunCompleted {
                run_id,
                position,
                metric: metric.clone(),
            })
            .await;

        metric
    }
}

/// The provider whose credential `agent` needs but `credentials` lacks.
///
/// Models outside the provider table need no credential and never report
/// one missing.
pub fn missing_credential(agent: &AgentConfig, credentials: &Credentials) -> Option<Provider> {
    let provider = Provider::from_model_id(&agent.model);
    provider.credential_key()?;
    (!credentials.has(provider)).then_some(provider)
}
