//! Agent configuration and per-position output models.
//!
//! An agent pipeline is two positionally aligned lists: the ordered
//! [`AgentConfig`] entries an operator edits, and one [`AgentOutput`] slot per
//! entry holding the text fed to that agent and the result of its last run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One configured step in the pipeline.
///
/// The identity of an agent is its position in the pipeline, not its name:
/// two agents may share a name, and removing an agent shifts every later
/// agent down by one index.
///
/// Agents can be defined in `.agent-relay/agents/*.md` files with YAML front
/// matter carrying the metadata and the file body carrying the system prompt.
///
/// # Example
///
/// ```markdown
/// ---
/// name: contract-analyst
/// description: Summarises contract obligations
/// model: gpt-4o-mini
/// user-prompt: "Summarise the contract below:"
/// temperature: 0.3
/// top-p: 0.9
/// max-tokens: 1200
/// ---
///
/// You are a contract analyst. Identify both parties and their obligations.
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct AgentConfig {
    /// Display label.
    pub name: String,

    /// Free-text description of the agent's purpose.
    #[serde(default)]
    pub description: String,

    /// System instruction sent with every run.
    ///
    /// When loaded from Markdown this is the file body, so it is skipped
    /// in front matter but kept in JSON snapshots.
    #[serde(default)]
    pub system_prompt: String,

    /// Prepended to the resolved input, separated by a blank line.
    #[serde(default)]
    pub user_prompt: String,

    /// Model identifier, resolved to a provider through the static model table.
    pub model: String,

    /// Sampling temperature, nominally in `[0, 2]`. Advisory only.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling mass, nominally in `[0, 1]`. Advisory only.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Generation length cap, nominally in `[100, 32000]`. Advisory only.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    1000
}

/// Input and most recent result for one pipeline position.
///
/// A zero-valued slot (`AgentOutput::default()`) is what the pipeline holds
/// before the agent at that position has ever been fed or run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct AgentOutput {
    /// Text actually fed to the agent: chained from the previous position or
    /// typed in by the operator.
    pub input: String,

    /// Text produced by the most recent run. Empty until the first run.
    pub output: String,

    /// Wall-clock latency of the most recent run, measured around the
    /// model call.
    pub elapsed_seconds: f64,

    /// Token count reported (or estimated) for the most recent run.
    pub token_count: u32,

    /// Normalized provider label of the most recent run, e.g. `"Gemini"`.
    pub provider_label: String,

    /// Model identifier the most recent run was issued against.
    pub resolved_model_id: String,
}

impl AgentOutput {
    /// Whether this position has completed at least one run.
    pub fn has_run(&self) -> bool {
        !self.resolved_model_id.is_empty()
    }
}

/// A targeted replacement of one [`AgentConfig`] field.
///
/// Numeric ranges are a presentation concern; values are stored as given.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum AgentField {
    Name(String),
    Description(String),
    SystemPrompt(String),
    UserPrompt(String),
    Model(String),
    Temperature(f32),
    TopP(f32),
    MaxTokens(u32),
}

impl AgentField {
    /// Overwrite the matching field of `agent`, leaving every other field as is.
    pub fn apply(self, agent: &mut AgentConfig) {
        match self {
            Self::Name(v) => agent.name = v,
            Self::Description(v) => agent.description = v,
            Self::SystemPrompt(v) => agent.system_prompt = v,
            Self::UserPrompt(v) => agent.user_prompt = v,
            Self::Model(v) => agent.model = v,
            Self::Temperature(v) => agent.temperature = v,
            Self::TopP(v) => agent.top_p = v,
            Self::MaxTokens(v) => agent.max_tokens = v,
        }
    }

    /// Field name as used in front matter.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Description(_) => "description",
            Self::SystemPrompt(_) => "system-prompt",
            Self::UserPrompt(_) => "user-prompt",
            Self::Model(_) => "model",
            Self::Temperature(_) => "temperature",
            Self::TopP(_) => "top-p",
            Self::MaxTokens(_) => "max-tokens",
        }
    }
}
