//! Gemini (Google) logo generation client.

use crate::credential::ApiKeySlot;
use crate::error::{sanitize_error_message, Result, StudioError};
use crate::image::provider::ImageGenerator;
use crate::image::types::{GenerationRequest, DATA_URI_PREFIX};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Model every logo is generated with (Nano Banana Pro).
pub const MODEL_ID: &str = "gemini-3-pro-image-preview";

/// Aspect ratio of every logo.
pub const LOGO_ASPECT_RATIO: &str = "1:1";

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MISSING_KEY_MESSAGE: &str = "API Key not found. Please select a key.";

/// Builder for GeminiLogoClient.
#[derive(Debug, Clone, Default)]
pub struct GeminiLogoClientBuilder {
    key_slot: Option<ApiKeySlot>,
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl GeminiLogoClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.key_slot = Some(ApiKeySlot::with_key(key));
        self
    }

    /// Reads the API key from a shared slot on every call.
    pub fn key_slot(mut self, slot: ApiKeySlot) -> Self {
        self.key_slot = Some(slot);
        self
    }

    /// Overrides the API root (e.g., for a proxy or a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the client. Falls back to the key environment variables.
    pub fn build(self) -> GeminiLogoClient {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        GeminiLogoClient {
            client: self.client.unwrap_or_default(),
            key_slot: self.key_slot.unwrap_or_else(ApiKeySlot::from_env),
            base_url,
        }
    }
}

/// Client for the fixed Gemini logo model.
#[derive(Debug, Clone)]
pub struct GeminiLogoClient {
    client: reqwest::Client,
    key_slot: ApiKeySlot,
    base_url: String,
}

impl GeminiLogoClient {
    /// Creates a new `GeminiLogoClientBuilder`.
    pub fn builder() -> GeminiLogoClientBuilder {
        GeminiLogoClientBuilder::new()
    }

    /// Returns the key slot this client reads from.
    pub fn key_slot(&self) -> &ApiKeySlot {
        &self.key_slot
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, MODEL_ID)
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self
            .key_slot
            .get()
            .ok_or_else(|| StudioError::CredentialMissing(MISSING_KEY_MESSAGE.into()))?;

        let start = Instant::now();
        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(
            model = MODEL_ID,
            resolution = %request.resolution(),
            "sending logo generation request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = parse_error(status.as_u16(), &text);
            if matches!(err, StudioError::CredentialMissing(_)) {
                // a rejected key no longer counts as selected
                self.key_slot.clear();
            }
            return Err(err);
        }

        let text = response.text().await?;
        let gemini_response: GeminiResponse = serde_json::from_str(&text)?;
        let uri = extract_image_uri(gemini_response)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            payload_len = uri.len() - DATA_URI_PREFIX.len(),
            "logo generation complete"
        );
        Ok(uri)
    }
}

fn parse_error(status: u16, text: &str) -> StudioError {
    let text = sanitize_error_message(text);
    if status == 401 || status == 403 {
        return StudioError::CredentialMissing(format!("{status} - {text}"));
    }
    StudioError::GenerationFailed(format!("{status} - {text}"))
}

/// Picks the image out of a Gemini response.
///
/// Only the first candidate is inspected, in part order. An image carried by
/// a later candidate is ignored and yields [`StudioError::NoImageReturned`].
pub fn extract_image_uri(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(StudioError::NoImageReturned)?;

    candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .find(|inline| !inline.data.is_empty())
        .map(|inline| format!("{DATA_URI_PREFIX}{}", inline.data))
        .ok_or(StudioError::NoImageReturned)
}

#[async_trait]
impl ImageGenerator for GeminiLogoClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self.generate_impl(request).await {
            Ok(uri) => Ok(uri),
            Err(e) => {
                tracing::warn!(error = %e, "logo generation failed");
                Err(e)
            }
        }
    }

    fn model(&self) -> &str {
        MODEL_ID
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
    image_size: &'static str,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart {
                    text: req.prompt().to_string(),
                }],
            }],
            generation_config: GeminiConfig {
                image_config: ImageConfig {
                    aspect_ratio: LOGO_ASPECT_RATIO,
                    image_size: req.resolution().as_str(),
                },
            },
        }
    }
}

/// Body of a `generateContent` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    data: String,
}
