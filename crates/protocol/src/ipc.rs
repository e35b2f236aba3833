//! Inter-process communication protocol.
//!
//! This module defines the message types exchanged between an operator
//! front end and the core pipeline logic.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the front end to the core
//! - `Event`: State changes reported from the core to the front end
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "runAgent",
//!   "payload": { "position": 0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::AgentField;
use crate::metrics_models::RunMetric;
use crate::pipeline_models::PipelineSnapshot;
use crate::provider_models::Provider;

/// Operations sent from the front end to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Append an agent with default settings.
    AddAgent,

    /// Remove the agent and its output slot at `position`.
    RemoveAgent { position: usize },

    /// Replace one configuration field of the agent at `position`.
    EditAgent { position: usize, field: AgentField },

    /// Manually overwrite the input fed to the agent at `position`.
    SetInput { position: usize, text: String },

    /// Replace the shared document text.
    SetDocumentText { text: String },

    /// Run the agent at `position`.
    ///
    /// Refused with `RunRejected` while another run is in flight.
    RunAgent { position: usize },

    /// Store (or, with an empty secret, clear) a provider credential.
    SetCredential { provider: Provider, secret: String },

    /// Request a full snapshot of the pipeline.
    GetSnapshot,

    /// Shut down the session.
    Shutdown,
}

/// Events sent from the core to the front end.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// An agent was appended at `position`.
    AgentAdded { position: usize, name: String },

    /// The agent at `position` was removed; later positions shifted down.
    AgentRemoved { position: usize },

    /// A configuration field of the agent at `position` changed.
    AgentEdited { position: usize, field: String },

    /// The input of the agent at `position` was overwritten by the operator.
    InputEdited { position: usize },

    /// The shared document text was replaced.
    DocumentUpdated { length: usize },

    /// The provider of the agent at `position` has no credential; the run
    /// proceeds with a substitute result.
    CredentialMissing { position: usize, provider: Provider },

    /// A credential was stored or cleared.
    CredentialUpdated { provider: Provider, present: bool },

    /// A run of the agent at `position` began.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        position: usize,
    },

    /// A run finished and its results were committed.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        position: usize,
        metric: RunMetric,
    },

    /// A run request was refused.
    RunRejected { position: usize, reason: String },

    /// An edit was refused, e.g. a removal while a run is in flight.
    EditRejected { reason: String },

    /// Full pipeline state, in reply to `GetSnapshot`.
    Snapshot { snapshot: PipelineSnapshot },
}
