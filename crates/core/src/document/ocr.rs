//! OCR extractors: Gemini multimodal transcription and its simulated
//! stand-in.

use super::{mime_type, read, DocumentExtractor, ExtractError};
use crate::agents::adapters::GeminiAdapter;
use crate::agents::base::InvokeError;
use crate::credentials::Credentials;
use ar_protocol::Provider;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Model used for document transcription.
pub const OCR_MODEL: &str = "gemini-2.5-flash";

/// Instruction sent after the document.
pub const OCR_INSTRUCTION: &str = "Please transcribe the full text of this document into Markdown format. Preserve tables, headers, and structure. If there are forms, extract the values.";

/// Text used when the model returns no transcription.
const EMPTY_TRANSCRIPTION: &str = "No text extracted.";

/// Transcribes documents with Gemini.
#[derive(Debug, Clone)]
pub struct GeminiOcrExtractor {
    adapter: GeminiAdapter,
    model_id: String,
}

impl GeminiOcrExtractor {
    pub fn new(adapter: GeminiAdapter) -> Self {
        Self {
            adapter,
            model_id: OCR_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl DocumentExtractor for GeminiOcrExtractor {
    async fn extract(&self, path: &Path, credentials: &Credentials) -> Result<String, ExtractError> {
        let ocr_error = |source: InvokeError| ExtractError::Ocr {
            path: path.to_path_buf(),
            source,
        };

        let api_key = credentials
            .get(Provider::Gemini)
            .ok_or_else(|| ocr_error(InvokeError::MissingCredential(Provider::Gemini)))?;
        let data = read(path).await?;
        let mime = mime_type(path);

        tracing::info!(
            "transcribing {} ({}, {} bytes) with {}",
            path.display(),
            mime,
            data.len(),
            self.model_id
        );
        let text = self
            .adapter
            .transcribe(&self.model_id, api_key, mime, &data, OCR_INSTRUCTION)
            .await
            .map_err(ocr_error)?;

        if text.is_empty() {
            Ok(EMPTY_TRANSCRIPTION.to_string())
        } else {
            Ok(text)
        }
    }
}

/// Produces a clearly labelled simulated transcription.
///
/// The file is still read, so a missing document fails the same way it
/// would with real OCR.
#[derive(Debug, Clone)]
pub struct SubstituteOcrExtractor {
    delay: Duration,
}

impl SubstituteOcrExtractor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No simulated latency.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl DocumentExtractor for SubstituteOcrExtractor {
    async fn extract(&self, path: &Path, _credentials: &Credentials) -> Result<String, ExtractError> {
        let size = read(path).await?.len();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(simulated_transcription(&name, mime_type(path), size))
    }
}

fn simulated_transcription(name: &str, mime: &str, size: usize) -> String {
    let kilobytes = size as f64 / 1024.0;
    let date = chrono::Local::now().format("%Y-%m-%d");

    format!(
        "# OCR Result for {name}

**Document Info**: {mime}, {kilobytes:.2} KB
**Date**: {date}

## Executive Summary
(Simulated Extraction) This document appears to be a regulatory submission containing technical specifications and clinical data.

## Extracted Content
**Product Name**: Example Medical Device 2000
**Manufacturer**: Global MedTech Inc.
**Indication**: For the treatment of mild to moderate hypertension.

### Clinical Data Table
| Parameter | Cohort A | Cohort B | P-Value |
|-----------|----------|----------|---------|
| N         | 150      | 150      | -       |
| Response  | 85%      | 62%      | <0.001  |

*Note: To get real AI OCR, set a Gemini API key.*"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_transcription_header() {
        let text = simulated_transcription("scan.pdf", "application/pdf", 2048);
        assert!(text.starts_with("# OCR Result for scan.pdf\n"));
        assert!(text.contains("**Document Info**: application/pdf, 2.00 KB"));
        assert!(text.contains("| Response  | 85%      | 62%      | <0.001  |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_substitute_waits_configured_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0u8; 512]).unwrap();

        let extractor = SubstituteOcrExtractor::new(Duration::from_millis(2500));
        let started = tokio::time::Instant::now();
        let text = extractor.extract(&path, &Credentials::default()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert!(text.contains("image/png, 0.50 KB"));
    }

    #[tokio::test]
    async fn test_substitute_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SubstituteOcrExtractor::immediate()
            .extract(&dir.path().join("gone.pdf"), &Credentials::default())
            .await;
        assert!(matches!(result, Err(ExtractError::Read { .. })));
    }

    #[tokio::test]
    async fn test_gemini_ocr_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let adapter = GeminiAdapter::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let result = GeminiOcrExtractor::new(adapter)
            .extract(&path, &Credentials::default())
            .await;
        assert!(matches!(
            result,
            Err(ExtractError::Ocr {
                source: InvokeError::MissingCredential(Provider::Gemini),
                ..
            })
        ));
    }
}
