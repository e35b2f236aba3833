//! Substitute (mock) invoker used when no real provider call can be made.

use crate::agents::base::{estimate_tokens, Invocation, InvocationRequest, ModelInvoker};
use async_trait::async_trait;
use std::time::Duration;

/// Number of prompt characters echoed back in a substitute result.
const PREVIEW_CHARS: usize = 50;

/// Returns a clearly labelled placeholder instead of calling a provider.
///
/// The text always starts with `[MOCK OUTPUT for <model>]`, so a substitute
/// result can never be mistaken for real model output.
#[derive(Debug, Clone)]
pub struct SubstituteInvoker {
    delay: Duration,
    token_overhead: u32,
}

impl SubstituteInvoker {
    /// Create a substitute that waits `delay` before answering and adds
    /// `token_overhead` to its token estimate.
    pub fn new(delay: Duration, token_overhead: u32) -> Self {
        Self {
            delay,
            token_overhead,
        }
    }

    /// No delay, no token overhead.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    /// Labelled placeholder text for `request`.
    pub fn render(request: &InvocationRequest) -> String {
        let preview: String = request.user_prompt.chars().take(PREVIEW_CHARS).collect();
        format!(
            "[MOCK OUTPUT for {}]\n\nProcessed request: {}...\n\nAnalyzed content based on regulatory standards.",
            request.model_id, preview
        )
    }

    /// Produce a substitute result carrying `provider_label`.
    pub async fn generate(&self, request: &InvocationRequest, provider_label: &str) -> Invocation {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Invocation {
            text: Self::render(request),
            token_count: estimate_tokens(&request.user_prompt, self.token_overhead),
            provider_label: provider_label.to_string(),
        }
    }
}

impl Default for SubstituteInvoker {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), 100)
    }
}

#[async_trait]
impl ModelInvoker for SubstituteInvoker {
    async fn invoke(&self, request: &InvocationRequest) -> Invocation {
        self.generate(request, request.provider().label()).await
    }
}

/// Whether `text` is a substitute result.
pub fn is_substitute(text: &str) -> bool {
    text.starts_with("[MOCK OUTPUT for ")
}
