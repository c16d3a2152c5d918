//! Error types for logo generation.

/// Longest upstream error body kept in an error message.
const MAX_ERROR_DETAIL_LEN: usize = 500;

/// Errors that can occur while generating a logo.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// No usable API key is selected, or the service rejected the key.
    #[error("{0}")]
    CredentialMissing(String),

    /// The response was well-formed but carried no inline image data.
    #[error("No image data received from the model.")]
    NoImageReturned,

    /// Transport or service-level failure.
    #[error("{0}")]
    GenerationFailed(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to decode the base64 payload of a generated image.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Returns the detail text shown after the user-facing failure prefix.
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// Returns true if recovery means prompting for an API key.
    ///
    /// The remote service does not guarantee a structured auth code, so
    /// besides [`StudioError::CredentialMissing`] this matches the detail
    /// text against `"403"` and `"API Key"`.
    pub fn needs_credential(&self) -> bool {
        if matches!(self, Self::CredentialMissing(_)) {
            return true;
        }
        let detail = self.detail();
        detail.contains("403") || detail.contains("API Key")
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        Self::GenerationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::GenerationFailed(format!("malformed response: {err}"))
    }
}

/// Flattens an upstream error body onto one line and caps its length.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if flat.chars().count() <= MAX_ERROR_DETAIL_LEN {
        return flat;
    }
    let mut truncated: String = flat.chars().take(MAX_ERROR_DETAIL_LEN).collect();
    truncated.push_str("...");
    truncated
}

/// Result type alias for logo generation operations.
pub type Result<T> = std::result::Result<T, StudioError>;
