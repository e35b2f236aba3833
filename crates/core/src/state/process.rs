//! Run lifecycle: at most one agent run in flight.
//!
//! A run moves through `Idle -> Running { position } -> Idle`. Entering
//! `Running` goes through [`RunGate::try_begin`], which hands out a
//! [`RunTicket`]. Dropping the ticket returns the gate to `Idle`, so a run
//! that unwinds still releases it.

use ar_protocol::RunStatus;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Reasons a run request is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("agent at position {running} is already running")]
    Busy { running: usize },
    #[error("no agent at position {position}")]
    NoAgent { position: usize },
}

/// Guard that admits a single run at a time.
#[derive(Debug, Clone, Default)]
pub struct RunGate {
    status: Arc<Mutex<RunStatus>>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current run status.
    pub fn status(&self) -> RunStatus {
        *lock(&self.status)
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// Move from `Idle` to `Running { position }`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Busy`] if a run is already in flight. The status
    /// is left untouched in that case.
    pub fn try_begin(&self, position: usize) -> Result<RunTicket, RunError> {
        let mut status = lock(&self.status);
        if let RunStatus::Running { position: running } = *status {
            return Err(RunError::Busy { running });
        }
        *status = RunStatus::Running { position };
        Ok(RunTicket {
            status: Arc::clone(&self.status),
            position,
        })
    }
}

/// Proof that the holder owns the in-flight run.
#[derive(Debug)]
pub struct RunTicket {
    status: Arc<Mutex<RunStatus>>,
    position: usize,
}

impl RunTicket {
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        *lock(&self.status) = RunStatus::Idle;
    }
}

// The status is a plain Copy value, so a poisoned lock still holds a valid one.
fn lock(status: &Mutex<RunStatus>) -> MutexGuard<'_, RunStatus> {
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
