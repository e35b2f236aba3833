//! Model invoker adapters.
//!
//! Each adapter serves one way of producing text for a model identifier.

pub mod gemini_adapter;
pub mod substitute;

pub use gemini_adapter::GeminiAdapter;
pub use substitute::{is_substitute, SubstituteInvoker};
