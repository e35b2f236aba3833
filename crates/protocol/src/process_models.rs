//! Run lifecycle state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Whether an agent run is in flight.
///
/// At most one run may be outstanding across the whole pipeline, so the
/// lifecycle is a two-state machine:
///
/// `Idle -> Running { position } -> Idle`
///
/// A request to start a run while `Running` is refused rather than queued.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, TS)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No run is outstanding.
    #[default]
    Idle,

    /// The agent at `position` is being invoked.
    Running { position: usize },
}

impl RunStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// The position being run, if any.
    pub fn running_position(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Running { position } => Some(*position),
        }
    }
}
