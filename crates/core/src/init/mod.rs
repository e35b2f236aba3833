//! Scaffolding for new `.agent-relay/` project directories.
//!
//! Generates a `.agent-relay/` directory with templates for:
//! - Global configuration (`config.toml`)
//! - Agent definitions (`agents/*.md`)
//! - Pipelines (`pipelines/*.yaml`)
//!
//! # Example
//!
//! ```no_run
//! use ar_core::init::{generate_relay_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_relay_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_relay_structure, InitOptions};
pub use templates::{get_template, list_templates};
