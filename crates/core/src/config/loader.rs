//! Configuration file loader for the `.agent-relay/` directory structure.
//!
//! This module loads and parses every configuration file under
//! `.agent-relay/`:
//! - `config.toml`: Global settings
//! - `agents/*.md`: Agent definitions with YAML front matter
//! - `pipelines/*.yaml`: Pipeline definitions

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::CONFIG_DIR;
use ar_protocol::{AgentConfig, GlobalConfig, PipelineDefinition};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads all configuration from the `.agent-relay/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.agent-relay/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. Missing directories
/// or files yield defaults rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML, or Markdown front matter)
/// - A pipeline references an agent that no agent file defines
///
/// # Example
///
/// ```rust,no_run
/// use ar_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agents", config.agents.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let relay_dir = root.join(CONFIG_DIR);

    if !relay_dir.exists() {
        tracing::debug!("{} not found, using defaults", relay_dir.display());
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&relay_dir)?;
    let agents = load_agents(&relay_dir)?;
    let pipelines = load_pipelines(&relay_dir, &agents)?;

    tracing::debug!(
        "loaded {} agents and {} pipelines from {}",
        agents.len(),
        pipelines.len(),
        relay_dir.display()
    );

    Ok(AppConfig {
        global,
        agents,
        pipelines,
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(relay_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = relay_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content = read(&config_path)?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads all agent definitions from `agents/*.md`.
///
/// The Markdown body, when present, becomes the agent's system prompt.
fn load_agents(relay_dir: &Path) -> ConfigResult<Vec<AgentConfig>> {
    let matter = Matter::<YAML>::new();
    let mut agents = Vec::new();

    for path in files_with_extension(&relay_dir.join("agents"), &["md"])? {
        let content = read(&path)?;
        let parsed = matter.parse(&content);

        let mut agent: AgentConfig = parsed
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.clone(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.clone(),
                reason: format!("Failed to deserialize front matter: {}", e),
            })?;

        let body = parsed.content.trim();
        if !body.is_empty() {
            agent.system_prompt = body.to_string();
        }

        agents.push(agent);
    }

    Ok(agents)
}

/// Loads all pipeline definitions from `pipelines/*.yaml`.
fn load_pipelines(
    relay_dir: &Path,
    agents: &[AgentConfig],
) -> ConfigResult<Vec<PipelineDefinition>> {
    let mut pipelines = Vec::new();

    for path in files_with_extension(&relay_dir.join("pipelines"), &["yaml", "yml"])? {
        let content = read(&path)?;

        let pipeline: PipelineDefinition =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.clone(),
                source,
            })?;

        if let Some(unknown) = pipeline
            .agents
            .iter()
            .find(|name| !agents.iter().any(|agent| &agent.name == *name))
        {
            return Err(ConfigError::UnknownAgent {
                path,
                pipeline: pipeline.name.clone(),
                agent: unknown.clone(),
            });
        }

        pipelines.push(pipeline);
    }

    Ok(pipelines)
}

/// Files directly inside `dir` with one of `extensions`, sorted by name.
///
/// A missing directory yields no files.
fn files_with_extension(dir: &Path, extensions: &[&str]) -> ConfigResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matches {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn read(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
