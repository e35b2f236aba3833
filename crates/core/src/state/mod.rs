//! Pipeline state management.
//!
//! This module provides:
//! - [`PipelineState`]: agents, outputs, run log and document text
//! - [`PipelineEditor`]: structural edits that keep outputs aligned
//! - [`RunGate`]: the one-run-at-a-time lifecycle
//! - [`StateManager`]: Op dispatch for a front end

pub mod editor;
pub mod manager;
pub mod pipeline;
pub mod process;

pub use editor::PipelineEditor;
pub use manager::StateManager;
pub use pipeline::PipelineState;
pub use process::{RunError, RunGate, RunTicket};
