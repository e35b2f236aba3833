//! Base ModelInvoker trait and supporting types.

use crate::credentials::Credentials;
use ar_protocol::{AgentConfig, Provider};
use async_trait::async_trait;
use thiserror::Error;

/// Everything a provider needs to generate one completion.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Model identifier, resolved to a provider through the model table.
    pub model_id: String,

    /// System instruction.
    pub system_prompt: String,

    /// Full user turn: the agent's user prompt, a blank line, then the
    /// resolved input.
    pub user_prompt: String,

    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,

    /// Provider credentials available for this call.
    pub credentials: Credentials,
}

impl InvocationRequest {
    /// Create a new request with permissive generation defaults and no
    /// credentials.
    pub fn new(model_id: String, system_prompt: String, user_prompt: String) -> Self {
        Self {
            model_id,
            system_prompt,
            user_prompt,
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1000,
            credentials: Credentials::default(),
        }
    }

    /// Build the request for one run of `agent` over `input`.
    pub fn for_agent(agent: &AgentConfig, input: &str) -> Self {
        Self::new(
            agent.model.clone(),
            agent.system_prompt.clone(),
            compose_user_prompt(&agent.user_prompt, input),
        )
        .with_generation(agent.temperature, agent.top_p, agent.max_tokens)
    }

    /// Set the generation parameters.
    pub fn with_generation(mut self, temperature: f32, top_p: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self.max_tokens = max_tokens;
        self
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Provider this request resolves to.
    pub fn provider(&self) -> Provider {
        Provider::from_model_id(&self.model_id)
    }
}

/// Join an agent's user prompt and its resolved input with a blank line.
pub fn compose_user_prompt(user_prompt: &str, input: &str) -> String {
    format!("{user_prompt}\n\n{input}")
}

/// Estimate a token count from prompt length: one token per four characters,
/// rounded down, plus a fixed `overhead`.
///
/// # Examples
///
/// ```
/// use ar_core::agents::estimate_tokens;
///
/// assert_eq!(estimate_tokens(&"x".repeat(412), 0), 103);
/// assert_eq!(estimate_tokens("abc", 100), 100);
/// ```
pub fn estimate_tokens(prompt: &str, overhead: u32) -> u32 {
    let chars = u32::try_from(prompt.chars().count()).unwrap_or(u32::MAX);
    (chars / 4).saturating_add(overhead)
}

/// Result of one model call.
///
/// Failures are carried as text, never as an error value: a result whose
/// text begins with `"Error: "` and whose token count is zero is a failed
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub text: String,
    pub token_count: u32,
    /// Normalized provider label, e.g. `"Gemini"`.
    pub provider_label: String,
}

impl Invocation {
    /// Encode a failure as a textual payload with zero tokens.
    pub fn error(provider_label: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error: {message}"),
            token_count: 0,
            provider_label: provider_label.into(),
        }
    }

    /// Whether this result encodes a failed call.
    pub fn is_error(&self) -> bool {
        self.token_count == 0 && self.text.starts_with("Error: ")
    }
}

/// Errors raised inside a provider adapter.
///
/// These never cross the [`ModelInvoker`] boundary; the router turns them
/// into [`Invocation::error`] payloads.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("{0} API Key missing")]
    MissingCredential(Provider),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API call failed: {0}")]
    ApiError(String),
}

/// Generates text for a model identifier.
///
/// Implementations must not fail: internal errors are returned as an
/// [`Invocation::error`] payload. Implementations are also responsible for
/// their own timeouts, since callers wait on `invoke` without one.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest) -> Invocation;
}
