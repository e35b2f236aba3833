//! Shared helpers for the integration tests.
//!
//! - Fixtures (agents, pipelines, project directories)
//! - Scripted model invokers
//! - Event collection

pub mod fixtures;
pub mod invokers;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use invokers::*;

use ar_protocol::Event;
use tokio::sync::mpsc;

/// Drain every event currently buffered in `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
