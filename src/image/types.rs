//! Core types for logo generation.

use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prompt pre-filled in the studio.
pub const DEFAULT_PROMPT: &str = "Minimalist high-end locksmith logo, golden key symbol, deep emerald green background, elegant serif typography, luxury branding, photorealistic 8k render, cinematic lighting";

/// Prefix shared by every generated data URI.
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Prefix of downloaded file names.
pub const DOWNLOAD_FILE_PREFIX: &str = "honest-locksmiths-logo-";

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum ImageResolution {
    /// 1K output.
    #[default]
    #[serde(rename = "1K")]
    Low,
    /// 2K output.
    #[serde(rename = "2K")]
    Medium,
    /// 4K output.
    #[serde(rename = "4K")]
    High,
}

impl ImageResolution {
    /// All tiers, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the Gemini `imageSize` value (e.g., "2K").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "1K",
            Self::Medium => "2K",
            Self::High => "4K",
        }
    }
}

impl std::fmt::Display for ImageResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImageResolution {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1k" | "low" => Ok(Self::Low),
            "2k" | "medium" => Ok(Self::Medium),
            "4k" | "high" => Ok(Self::High),
            other => Err(StudioError::InvalidRequest(format!(
                "unknown resolution '{other}' (expected 1K, 2K or 4K)"
            ))),
        }
    }
}

/// A request to generate a logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    resolution: ImageResolution,
}

impl GenerationRequest {
    /// Creates a request, rejecting an empty prompt.
    pub fn new(prompt: impl Into<String>, resolution: ImageResolution) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(StudioError::InvalidRequest(
                "prompt must not be empty".into(),
            ));
        }
        Ok(Self { prompt, resolution })
    }

    /// The text prompt describing the logo.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The requested resolution tier.
    pub fn resolution(&self) -> ImageResolution {
        self.resolution
    }
}

/// The most recent generated logo.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be saved or displayed"]
pub struct GeneratedImage {
    /// Creation time in epoch milliseconds.
    pub id: String,
    /// `data:image/png;base64,...` URI.
    pub data_uri: String,
    /// Prompt the image was generated from.
    pub prompt: String,
    /// Resolution tier it was generated at.
    pub resolution: ImageResolution,
    /// When the generation completed.
    pub created_at: DateTime<Utc>,
}

impl GeneratedImage {
    /// Wraps a data URI produced for `request`, stamped with the current time.
    pub fn new(data_uri: String, request: &GenerationRequest) -> Self {
        Self::at(data_uri, request, Utc::now())
    }

    /// Same as [`GeneratedImage::new`] with an explicit timestamp.
    pub fn at(data_uri: String, request: &GenerationRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: created_at.timestamp_millis().to_string(),
            data_uri,
            prompt: request.prompt().to_string(),
            resolution: request.resolution(),
            created_at,
        }
    }

    /// File name offered for download.
    pub fn download_file_name(&self) -> String {
        format!(
            "{DOWNLOAD_FILE_PREFIX}{}.png",
            self.created_at.timestamp_millis()
        )
    }

    /// The base64 payload after the data URI header.
    pub fn base64_payload(&self) -> &str {
        match self.data_uri.find(";base64,") {
            Some(pos) => &self.data_uri[pos + 8..],
            None => &self.data_uri,
        }
    }

    /// Decodes the payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(self.base64_payload())
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}
