//! The pipeline's single source of truth.

use crate::agents::base::Invocation;
use crate::agents::defaults::default_agents;
use ar_protocol::{AgentConfig, AgentOutput, PipelineSnapshot, RunMetric, RunStatus};
use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

/// Ordered agents, their positionally aligned outputs, the run log, and the
/// shared document text.
///
/// Invariant: `outputs.len() == agents.len()` after every public operation.
/// Structural changes go through [`PipelineEditor`](super::editor::PipelineEditor),
/// which keeps the two lists aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    pub(crate) agents: Vec<AgentConfig>,
    pub(crate) outputs: Vec<AgentOutput>,
    pub(crate) metrics: Vec<RunMetric>,
    pub(crate) document_text: String,
}

impl PipelineState {
    /// Create a pipeline over `agents`, each with a zero-valued output slot.
    pub fn new(agents: Vec<AgentConfig>) -> Self {
        let outputs = vec![AgentOutput::default(); agents.len()];
        Self {
            agents,
            outputs,
            metrics: Vec::new(),
            document_text: String::new(),
        }
    }

    /// Create a pipeline over the built-in default agents.
    pub fn with_default_agents() -> Self {
        Self::new(default_agents())
    }

    pub fn agents(&self) -> &[AgentConfig] {
        &self.agents
    }

    pub fn outputs(&self) -> &[AgentOutput] {
        &self.outputs
    }

    /// The append-only run log.
    pub fn metrics(&self) -> &[RunMetric] {
        &self.metrics
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    pub fn set_document_text(&mut self, text: impl Into<String>) {
        self.document_text = text.into();
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, position: usize) -> Option<&AgentConfig> {
        self.agents.get(position)
    }

    pub fn output(&self, position: usize) -> Option<&AgentOutput> {
        self.outputs.get(position)
    }

    /// Text to feed the agent at `position`, resolved now.
    ///
    /// A non-empty `input` in the position's output slot wins. Otherwise
    /// position 0 falls back to the document text and every later position
    /// gets an empty string.
    pub fn resolve_input(&self, position: usize) -> String {
        match self.outputs.get(position) {
            Some(slot) if !slot.input.is_empty() => slot.input.clone(),
            _ if position == 0 => self.document_text.clone(),
            _ => String::new(),
        }
    }

    /// Record the result of a run of the agent at `position`.
    ///
    /// Overwrites every result field of the slot (the slot's `input` is kept),
    /// copies the output into the next position's `input` when there is a
    /// next position, and appends a metric to the run log.
    ///
    /// If the pipeline shrank below `position` since the run began, only the
    /// metric is recorded.
    pub(crate) fn commit_run(
        &mut self,
        position: usize,
        agent: &AgentConfig,
        result: Invocation,
        elapsed: Duration,
        run_id: Uuid,
    ) -> RunMetric {
        let elapsed_seconds = elapsed.as_secs_f64();

        let metric = RunMetric {
            run_id,
            agent: agent.name.clone(),
            latency_seconds: elapsed_seconds,
            token_count: result.token_count,
            provider_label: result.provider_label.clone(),
            timestamp: Utc::now(),
        };

        if position < self.agents.len() {
            self.ensure_slot(position);
            let slot = &mut self.outputs[position];
            slot.output = result.text;
            slot.elapsed_seconds = elapsed_seconds;
            slot.token_count = result.token_count;
            slot.provider_label = result.provider_label;
            slot.resolved_model_id = agent.model.clone();

            let next = position + 1;
            if next < self.agents.len() {
                let chained = self.outputs[position].output.clone();
                self.ensure_slot(next);
                self.outputs[next].input = chained;
                tracing::debug!("chained output of position {} into position {}", position, next);
            }
        } else {
            tracing::warn!(
                "position {} no longer exists ({} agents); recording metric only",
                position,
                self.agents.len()
            );
        }

        self.metrics.push(metric.clone());
        metric
    }

    /// Make sure an output slot exists at `position`, growing with
    /// zero-valued slots.
    pub(crate) fn ensure_slot(&mut self, position: usize) {
        if self.outputs.len() <= position {
            self.outputs.resize_with(position + 1, AgentOutput::default);
        }
    }

    /// A serializable copy of the whole state.
    pub fn snapshot(&self, status: RunStatus) -> PipelineSnapshot {
        PipelineSnapshot {
            agents: self.agents.clone(),
            outputs: self.outputs.clone(),
            metrics: self.metrics.clone(),
            document_text: self.document_text.clone(),
            status,
        }
    }
}
