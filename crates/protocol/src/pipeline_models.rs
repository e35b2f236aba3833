//! Pipeline definition and snapshot models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::agent_models::{AgentConfig, AgentOutput};
use crate::metrics_models::RunMetric;
use crate::process_models::RunStatus;

/// An ordered pipeline loaded from `.agent-relay/pipelines/*.yaml`.
///
/// # Example
///
/// ```yaml
/// name: regulatory-review
/// agents:
///   - application-extractor
///   - contract-analyst
///   - report-synthesiser
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct PipelineDefinition {
    /// Unique name identifying this pipeline.
    pub name: String,

    /// Agent names in execution order. Each must match the `name` of an
    /// agent defined in `.agent-relay/agents/*.md`. A name may repeat.
    pub agents: Vec<String>,
}

/// A consistent view of the whole pipeline at one instant.
///
/// `outputs` is positionally aligned with `agents`: `outputs.len() ==
/// agents.len()` holds in every snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct PipelineSnapshot {
    pub agents: Vec<AgentConfig>,
    pub outputs: Vec<AgentOutput>,
    /// Append-only run log for the whole session.
    pub metrics: Vec<RunMetric>,
    /// Shared document text, the default input of position 0.
    pub document_text: String,
    pub status: RunStatus,
}
