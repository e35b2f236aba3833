//! Document text extraction.
//!
//! Extraction is an external capability: the pipeline only needs
//! `extract(document) -> text`. Whatever performs OCR or parsing sits behind
//! [`DocumentExtractor`]; a failed extraction must not leave partial text in
//! the pipeline.
//!
//! The production extractor is [`DocumentRouter`]:
//! - Plain-text and Markdown files are read directly
//! - Other files go to Gemini OCR when a Gemini credential is set
//! - Otherwise a labelled simulated OCR result is produced

pub mod ocr;

pub use ocr::{GeminiOcrExtractor, SubstituteOcrExtractor};

use crate::agents::adapters::GeminiAdapter;
use crate::agents::base::InvokeError;
use crate::credentials::Credentials;
use ar_protocol::{GlobalConfig, Provider};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while extracting document text.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported document {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    #[error("OCR failed for {path}: {source}")]
    Ocr {
        path: PathBuf,
        source: InvokeError,
    },
}

/// Turns a document into text.
///
/// `credentials` are the provider keys available at the time of the call;
/// extractors that need none ignore them.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path, credentials: &Credentials) -> Result<String, ExtractError>;
}

/// Reads plain-text and Markdown documents as UTF-8.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path, _credentials: &Credentials) -> Result<String, ExtractError> {
        let bytes = read(path).await?;

        String::from_utf8(bytes).map_err(|_| ExtractError::Unsupported {
            path: path.to_path_buf(),
            reason: "not UTF-8 text; run it through an OCR extractor first".to_string(),
        })
    }
}

/// How a document will be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRoute {
    PlainText,
    Ocr,
    Substitute,
}

/// Picks an extractor per document.
pub struct DocumentRouter {
    ocr: Option<GeminiOcrExtractor>,
    substitute: SubstituteOcrExtractor,
}

impl DocumentRouter {
    /// With `ocr` set to `None`, every non-text document gets the simulated
    /// result.
    pub fn new(ocr: Option<GeminiOcrExtractor>, substitute: SubstituteOcrExtractor) -> Self {
        Self { ocr, substitute }
    }

    /// Build the router described by the global configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for OCR cannot be built.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, InvokeError> {
        let adapter = GeminiAdapter::new(
            config.gemini_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let substitute =
            SubstituteOcrExtractor::new(Duration::from_millis(config.substitute_delay_ms));

        Ok(Self::new(Some(GeminiOcrExtractor::new(adapter)), substitute))
    }

    /// Decide how `path` will be extracted, without extracting it.
    pub fn route(&self, path: &Path, credentials: &Credentials) -> DocumentRoute {
        if is_plain_text(path) {
            DocumentRoute::PlainText
        } else if self.ocr.is_some() && credentials.has(Provider::Gemini) {
            DocumentRoute::Ocr
        } else {
            DocumentRoute::Substitute
        }
    }
}

#[async_trait]
impl DocumentExtractor for DocumentRouter {
    async fn extract(&self, path: &Path, credentials: &Credentials) -> Result<String, ExtractError> {
        match (self.route(path, credentials), self.ocr.as_ref()) {
            (DocumentRoute::PlainText, _) => PlainTextExtractor.extract(path, credentials).await,
            (DocumentRoute::Ocr, Some(ocr)) => ocr.extract(path, credentials).await,
            (_, _) => {
                tracing::debug!("no OCR available for {}; simulating", path.display());
                self.substitute.extract(path, credentials).await
            }
        }
    }
}

/// Whether `path` is read as text rather than sent to OCR.
pub fn is_plain_text(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("txt" | "md" | "markdown"))
}

/// MIME type sent with a document, from its file extension.
pub fn mime_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("tif" | "tiff") => "image/tiff",
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

pub(crate) async fn read(path: &Path) -> Result<Vec<u8>, ExtractError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })
}
