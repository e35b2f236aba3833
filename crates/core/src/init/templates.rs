//! Embedded template files for `.agent-relay/` initialization.
//!
//! Templates live in the workspace `templates/` directory and are embedded
//! into the binary at compile time with `rust-embed`.

use rust_embed::RustEmbed;

/// Embedded template files from the workspace `templates/` directory.
///
/// With the `debug-embed` feature, debug builds read the files from disk
/// at runtime instead.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
///
/// # Arguments
/// * `path` - Relative path from templates root (e.g., "config.toml")
///
/// # Example
/// ```
/// use ar_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("substitute_delay_ms"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files under `prefix` (e.g., "agents/"), sorted.
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
