//! Gemini adapter calling the `generateContent` REST endpoint.

use crate::agents::base::{estimate_tokens, Invocation, InvocationRequest, InvokeError};
use ar_protocol::Provider;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text used when the API answers without any candidate text.
const EMPTY_RESPONSE_TEXT: &str = "No response text generated.";

/// Gemini adapter for generating text over HTTP.
///
/// The API key travels per request, so one adapter serves every credential
/// the operator configures during a session.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `timeout` - Upper bound on a single request
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, InvokeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| InvokeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model_id)
    }

    /// Generate a completion for `request`.
    ///
    /// The token count is the provider's `totalTokenCount` when reported,
    /// otherwise the prompt-length estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the Gemini credential is missing, the request
    /// fails, or the API answers with an error status.
    pub async fn generate(&self, request: &InvocationRequest) -> Result<Invocation, InvokeError> {
        let api_key = request
            .credentials
            .get(Provider::Gemini)
            .ok_or(InvokeError::MissingCredential(Provider::Gemini))?;

        let body = GenerateContentRequest::from(request);
        let payload = self.post(&request.model_id, api_key, &body).await?;

        Ok(payload.into_invocation(&request.user_prompt))
    }

    /// Transcribe a document into Markdown with a multimodal model.
    ///
    /// `data` is the raw file content; it is sent base64-encoded as inline
    /// data of type `mime_type`, followed by `instruction`.
    ///
    /// # Returns
    ///
    /// The transcription, or an empty string if the model produced no text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with an
    /// error status.
    pub async fn transcribe(
        &self,
        model_id: &str,
        api_key: &str,
        mime_type: &str,
        data: &[u8],
        instruction: &str,
    ) -> Result<String, InvokeError> {
        let body = GenerateContentRequest::inline_document(mime_type, data, instruction);
        let payload = self.post(model_id, api_key, &body).await?;
        Ok(payload.text())
    }

    async fn post(
        &self,
        model_id: &str,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, InvokeError> {
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|_| InvokeError::Config("Invalid API key format".to_string()))?;

        let response = self
            .client
            .post(self.generate_url(model_id))
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InvokeError::ApiError(status_message(status, &text)));
        }

        let mut payload: GenerateContentResponse = response.json().await?;
        if let Some(error) = payload.error.take() {
            return Err(InvokeError::ApiError(error.message));
        }
        Ok(payload)
    }
}

/// Describe an error status, using the API's own message when the body
/// carries one.
fn status_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ApiError,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("HTTP {status}: {}", envelope.error.message),
        Err(_) => format!("HTTP {status}"),
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn inline_document(mime_type: &str, data: &[u8], instruction: &str) -> Self {
        Self {
            system_instruction: None,
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(data),
                        }),
                        ..Part::default()
                    },
                    Part::text(instruction),
                ],
            }],
            generation_config: None,
        }
    }
}

impl From<&InvocationRequest> for GenerateContentRequest {
    fn from(request: &InvocationRequest) -> Self {
        let system_instruction = (!request.system_prompt.trim().is_empty())
            .then(|| Content::text(None, &request.system_prompt));

        Self {
            system_instruction,
            contents: vec![Content::text(Some("user"), &request.user_prompt)],
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_output_tokens: request.max_tokens,
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn into_invocation(self, user_prompt: &str) -> Invocation {
        let text = self.text();
        let token_count = self
            .usage_metadata
            .and_then(|u| u.total_token_count)
            .unwrap_or_else(|| estimate_tokens(user_prompt, 0));

        Invocation {
            text: if text.is_empty() {
                EMPTY_RESPONSE_TEXT.to_string()
            } else {
                text
            },
            token_count,
            provider_label: Provider::Gemini.label().to_string(),
        }
    }
}
