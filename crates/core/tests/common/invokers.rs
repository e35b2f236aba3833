//! Scripted model invokers for deterministic testing.

use ar_core::agents::{Invocation, InvocationRequest, ModelInvoker};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// The input part of a composed user prompt.
#[allow(dead_code)]
pub fn input_of(request: &InvocationRequest) -> &str {
    request
        .user_prompt
        .rsplit_once("\n\n")
        .map(|(_, input)| input)
        .unwrap_or(&request.user_prompt)
}

/// Records every request and answers `out(<input>)`.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingInvoker {
    requests: Mutex<Vec<InvocationRequest>>,
}

#[allow(dead_code)]
impl RecordingInvoker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<InvocationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Inputs seen so far, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| input_of(request).to_string())
            .collect()
    }
}

#[async_trait]
impl ModelInvoker for RecordingInvoker {
    async fn invoke(&self, request: &InvocationRequest) -> Invocation {
        self.requests.lock().unwrap().push(request.clone());
        Invocation {
            text: format!("out({})", input_of(request)),
            token_count: 7,
            provider_label: request.provider().label().to_string(),
        }
    }
}

/// Blocks every call until released, to hold a run in flight.
#[allow(dead_code)]
#[derive(Default)]
pub struct GatedInvoker {
    pub started: Notify,
    pub release: Notify,
}

#[allow(dead_code)]
impl GatedInvoker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ModelInvoker for GatedInvoker {
    async fn invoke(&self, request: &InvocationRequest) -> Invocation {
        self.started.notify_one();
        self.release.notified().await;
        Invocation {
            text: format!("released({})", input_of(request)),
            token_count: 1,
            provider_label: request.provider().label().to_string(),
        }
    }
}
