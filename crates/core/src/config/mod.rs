//! Configuration loading and management.
//!
//! This module loads and parses the configuration files of the
//! `.agent-relay/` directory.

pub mod error;
pub mod loader;
pub mod models;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".agent-relay";
