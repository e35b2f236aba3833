//! Model invocation and agent definitions.
//!
//! This module provides the `ModelInvoker` trait (Adapter Pattern), the
//! `ProviderRouter` that picks an adapter per request, and the built-in
//! agent definitions.

pub mod adapters;
pub mod base;
pub mod defaults;
pub mod manager;

pub use adapters::{is_substitute, GeminiAdapter, SubstituteInvoker};
pub use base::{
    compose_user_prompt, estimate_tokens, Invocation, InvocationRequest, InvokeError, ModelInvoker,
};
pub use defaults::{default_agents, new_agent};
pub use manager::{ProviderRouter, Route, SubstituteReason};
