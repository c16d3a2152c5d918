//! Logo image generation.

mod provider;
pub mod providers;
mod types;

pub use provider::ImageGenerator;
pub use types::{
    GeneratedImage, GenerationRequest, ImageResolution, DATA_URI_PREFIX, DEFAULT_PROMPT,
    DOWNLOAD_FILE_PREFIX,
};
