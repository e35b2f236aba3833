//! Model provider resolution.
//!
//! Every model identifier resolves to exactly one [`Provider`] through a
//! fixed lookup table. Identifiers missing from the table resolve to
//! [`Provider::Unknown`] rather than to a guessed vendor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// The closed set of model vendors the pipeline knows about.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Grok,
    Anthropic,
    Unknown,
}

/// Model identifiers offered to operators, with their vendor.
pub const MODEL_TABLE: &[(&str, Provider)] = &[
    ("gpt-5-nano", Provider::OpenAi),
    ("gpt-4o-mini", Provider::OpenAi),
    ("gpt-4.1-mini", Provider::OpenAi),
    ("gemini-2.5-flash", Provider::Gemini),
    ("gemini-2.5-flash-lite", Provider::Gemini),
    ("grok-4-fast-reasoning", Provider::Grok),
    ("grok-3-mini", Provider::Grok),
    ("claude-3-5-sonnet-20240620", Provider::Anthropic),
    ("claude-3-opus-20240229", Provider::Anthropic),
    ("claude-3-haiku-20240307", Provider::Anthropic),
];

impl Provider {
    /// Providers that accept a credential, in display order.
    pub const CREDENTIALED: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::Grok,
        Provider::Anthropic,
    ];

    /// Resolve a model identifier through [`MODEL_TABLE`].
    ///
    /// Matching is exact: `"GPT-4o-mini"` is not `"gpt-4o-mini"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ar_protocol::Provider;
    ///
    /// assert_eq!(Provider::from_model_id("gemini-2.5-flash"), Provider::Gemini);
    /// assert_eq!(Provider::from_model_id("gpt-4o-mini"), Provider::OpenAi);
    /// assert_eq!(Provider::from_model_id("llama-3"), Provider::Unknown);
    /// ```
    pub fn from_model_id(model_id: &str) -> Self {
        MODEL_TABLE
            .iter()
            .find(|(id, _)| *id == model_id)
            .map(|(_, provider)| *provider)
            .unwrap_or(Self::Unknown)
    }

    /// Normalized, human-readable label recorded with each run.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Grok => "Grok",
            Self::Anthropic => "Anthropic",
            Self::Unknown => "Unknown",
        }
    }

    /// Key under which this provider's credential is stored.
    ///
    /// `Unknown` has no credential slot.
    pub fn credential_key(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("openai"),
            Self::Gemini => Some("gemini"),
            Self::Grok => Some("grok"),
            Self::Anthropic => Some("anthropic"),
            Self::Unknown => None,
        }
    }

    /// Model identifiers in [`MODEL_TABLE`] belonging to this provider.
    pub fn models(&self) -> impl Iterator<Item = &'static str> + '_ {
        MODEL_TABLE
            .iter()
            .filter(move |(_, provider)| provider == self)
            .map(|(id, _)| *id)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no credentialed provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    /// Parse a credential key (`"openai"`, `"gemini"`, ...), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::CREDENTIALED
            .into_iter()
            .find(|provider| provider.credential_key() == Some(lower.as_str()))
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
