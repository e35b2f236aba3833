//! # ar-core
//!
//! Core pipeline state, agent runner and model invocation for agent-relay.
//!
//! This crate provides:
//! - The pipeline state (agents, aligned outputs, run log, document text)
//! - A single-agent runner with forward chaining and a one-run-at-a-time guard
//! - Model invokers: provider routing, Gemini over HTTP, substitute results
//! - Configuration loading from the `.agent-relay/` directory
//!
//! ## Modules
//!
//! - [`agents`]: `ModelInvoker` trait, provider routing and adapters
//! - [`config`]: Configuration loading and management
//! - [`credentials`]: Provider credentials and their persistence
//! - [`document`]: Document text extraction
//! - [`engine`]: The agent runner
//! - [`init`]: `.agent-relay/` scaffolding
//! - [`state`]: Pipeline state, editing, run lifecycle and session manager

pub mod agents;
pub mod config;
pub mod credentials;
pub mod document;
pub mod engine;
pub mod init;
pub mod state;
