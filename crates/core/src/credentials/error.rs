//! Error types for credential persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving credentials.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Failed to read the credential file.
    #[error("Failed to read credentials at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the credential file.
    #[error("Failed to write credentials at {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file is not valid JSON.
    #[error("Failed to parse credentials at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No platform configuration directory could be determined.
    #[error("Could not determine a configuration directory for credentials")]
    NoConfigDir,
}

/// Type alias for Result with CredentialError.
pub type CredentialResult<T> = Result<T, CredentialError>;
