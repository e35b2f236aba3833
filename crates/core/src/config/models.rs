//! Configuration models that aggregate all settings.
//!
//! [`AppConfig`] combines global settings, agent definitions, and pipeline
//! definitions into a single configuration object.

use crate::agents::defaults::default_agents;
use crate::config::error::{ConfigError, ConfigResult};
use ar_protocol::{AgentConfig, GlobalConfig, PipelineDefinition};

/// Unified application configuration loaded from `.agent-relay/`.
///
/// # Example
///
/// ```rust,no_run
/// use ar_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agents and {} pipelines",
///          config.agents.len(),
///          config.pipelines.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Agent definitions from `agents/*.md`, ordered by file name.
    pub agents: Vec<AgentConfig>,

    /// Pipeline definitions from `pipelines/*.yaml`, ordered by file name.
    pub pipelines: Vec<PipelineDefinition>,
}

impl AppConfig {
    pub fn agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines.iter().find(|pipeline| pipeline.name == name)
    }

    /// The ordered agents a session should start with.
    ///
    /// With a name, that pipeline's agents are returned. Without one, the
    /// first pipeline is used, then every agent file in order, and finally
    /// the built-in default agents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPipeline`] if `name` matches no
    /// pipeline.
    pub fn resolve_agents(&self, name: Option<&str>) -> ConfigResult<Vec<AgentConfig>> {
        let pipeline = match name {
            Some(name) => Some(
                self.pipeline(name)
                    .ok_or_else(|| ConfigError::UnknownPipeline(name.to_string()))?,
            ),
            None => self.pipelines.first(),
        };

        if let Some(pipeline) = pipeline {
            // Names were validated against `agents` when loading.
            return Ok(pipeline
                .agents
                .iter()
                .filter_map(|name| self.agent(name).cloned())
                .collect());
        }

        if self.agents.is_empty() {
            Ok(default_agents())
        } else {
            Ok(self.agents.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::defaults::new_agent;

    fn config() -> AppConfig {
        let mut first = new_agent(0);
        first.name = "extractor".to_string();
        let mut second = new_agent(1);
        second.name = "reporter".to_string();

        AppConfig {
            global: GlobalConfig::default(),
            agents: vec![first, second],
            pipelines: vec![PipelineDefinition {
                name: "reverse".to_string(),
                agents: vec!["reporter".to_string(), "extractor".to_string()],
            }],
        }
    }

    #[test]
    fn test_resolve_named_pipeline() {
        let agents = config().resolve_agents(Some("reverse")).unwrap();
        let names: Vec<_> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["reporter", "extractor"]);
    }

    #[test]
    fn test_resolve_unknown_pipeline() {
        let err = config().resolve_agents(Some("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPipeline(name) if name == "missing"));
    }

    #[test]
    fn test_resolve_without_pipelines_uses_agent_files() {
        let mut config = config();
        config.pipelines.clear();
        let agents = config.resolve_agents(None).unwrap();
        assert_eq!(agents[0].name, "extractor");
    }

    #[test]
    fn test_resolve_empty_config_uses_defaults() {
        let agents = AppConfig::default().resolve_agents(None).unwrap();
        assert_eq!(agents, default_agents());
    }
}
