//! Image generation backends.

mod gemini;

pub use gemini::{
    extract_image_uri, GeminiLogoClient, GeminiLogoClientBuilder, GeminiResponse,
    DEFAULT_BASE_URL, LOGO_ASPECT_RATIO, MODEL_ID,
};
