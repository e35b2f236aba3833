//! Global configuration models for `.agent-relay/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents global settings from `.agent-relay/config.toml`.
///
/// Every field is optional in the file; missing fields take the defaults
/// below.
///
/// # Example
///
/// ```toml
/// # .agent-relay/config.toml
/// substitute_delay_ms = 0
/// substitute_token_overhead = 100
/// request_timeout_secs = 60
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct GlobalConfig {
    /// Simulated latency of substitute (mock) results, in milliseconds.
    pub substitute_delay_ms: u64,

    /// Fixed token overhead added to the estimate on the substitute path.
    pub substitute_token_overhead: u32,

    /// Timeout applied to real provider requests, in seconds.
    pub request_timeout_secs: u64,

    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,

    /// Where provider credentials are persisted. Defaults to the platform
    /// configuration directory.
    #[ts(type = "string | null")]
    pub credentials_path: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            substitute_delay_ms: 1500,
            substitute_token_overhead: 100,
            request_timeout_secs: 120,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            credentials_path: None,
        }
    }
}
