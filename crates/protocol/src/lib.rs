//! # ar-protocol
//!
//! Core protocol definitions and data models for agent-relay.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (YAML pipelines, TOML config, Markdown agents)
//! - Pipeline state snapshots and run metrics
//! - Inter-process communication between a front end and the core
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent configuration and per-position outputs
//! - [`config_models`]: Global configuration from config.toml
//! - [`metrics_models`]: Run log entries and their aggregate view
//! - [`pipeline_models`]: Pipeline definitions and snapshots
//! - [`process_models`]: Run lifecycle state
//! - [`provider_models`]: Model identifier to provider resolution
//! - [`ipc`]: Operations and Events for front end / core communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for browser clients
//! - Independent compilation: No dependencies on other agent-relay crates

pub mod agent_models;
pub mod config_models;
pub mod ipc;
pub mod metrics_models;
pub mod pipeline_models;
pub mod process_models;
pub mod provider_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use ipc::*;
pub use metrics_models::*;
pub use pipeline_models::*;
pub use process_models::*;
pub use provider_models::*;
