//! Directory structure and file generation for `.agent-relay/`.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

const MINIMAL_AGENT: &str = "agents/01-application-extractor.md";
const MINIMAL_PIPELINE: &str = "pipelines/quick-extract.yaml";

/// Options for initializing a `.agent-relay/` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory in which `.agent-relay/` will be created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.agent-relay/` directory.
    pub force: bool,

    /// Only one agent and a pipeline that uses it.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a `.agent-relay/` directory from the embedded templates.
///
/// ```text
/// .agent-relay/
/// ├── config.toml
/// ├── agents/
/// │   ├── 01-application-extractor.md
/// │   └── 02..04 (unless minimal)
/// └── pipelines/
///     ├── quick-extract.yaml
///     └── regulatory-review.yaml (unless minimal)
/// ```
///
/// # Returns
///
/// The path of the generated directory.
///
/// # Errors
///
/// Returns an `InitError` if:
/// - The directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_relay_structure(options: InitOptions) -> InitResult<PathBuf> {
    let relay_dir = options.target_dir.join(CONFIG_DIR);

    if relay_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(relay_dir));
    }

    for sub in ["agents", "pipelines"] {
        let path = relay_dir.join(sub);
        fs::create_dir_all(&path).map_err(|source| InitError::DirectoryCreate { path, source })?;
    }

    write_template_file(&relay_dir, "config.toml")?;

    let templates: Vec<String> = if options.minimal {
        vec![MINIMAL_AGENT.to_string(), MINIMAL_PIPELINE.to_string()]
    } else {
        list_templates("agents/")
            .into_iter()
            .chain(list_templates("pipelines/"))
            .collect()
    };
    for template in &templates {
        write_template_file(&relay_dir, template)?;
    }

    tracing::info!(
        "initialized {} with {} templates",
        relay_dir.display(),
        templates.len() + 1
    );
    Ok(relay_dir)
}

fn write_template_file(relay_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = relay_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })
}
