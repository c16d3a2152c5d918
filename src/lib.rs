#![warn(missing_docs)]
//! Logo Studio - logo generation for the Honest Locksmiths brand.
//!
//! Sends a prompt and a resolution tier to Gemini's image model and returns
//! the image as a `data:` URI. Key selection is delegated to a host
//! capability injected through [`CredentialHost`].
//!
//! # Quick Start
//!
//! ```no_run
//! use logo_studio::{
//!     ApiKeySlot, CredentialGateway, GeminiLogoClient, ImageResolution, StudioController,
//!     StudioState,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GeminiLogoClient::builder().key_slot(ApiKeySlot::from_env()).build();
//!     let studio = StudioController::new(client, CredentialGateway::unavailable());
//!
//!     studio.set_resolution(ImageResolution::Medium).await;
//!     studio.submit().await;
//!
//!     if studio.state().await == StudioState::Success {
//!         let image = studio.current_image().await.unwrap();
//!         image.save(image.download_file_name()).unwrap();
//!     }
//! }
//! ```

pub mod controller;
pub mod credential;
mod error;
pub mod image;

// Re-export error types at crate root
pub use error::{Result, StudioError};

pub use controller::{StudioController, StudioState, SubmitOutcome, FAILURE_PREFIX};
pub use credential::{
    ApiKeySlot, CredentialGateway, CredentialHost, CredentialState, KeyPrompt,
    SlotCredentialHost,
};
pub use image::providers::{extract_image_uri, GeminiLogoClient, GeminiLogoClientBuilder};
pub use image::{
    GeneratedImage, GenerationRequest, ImageGenerator, ImageResolution, DATA_URI_PREFIX,
    DEFAULT_PROMPT,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::controller::{StudioController, StudioState, SubmitOutcome};
    pub use crate::credential::{ApiKeySlot, CredentialGateway, CredentialHost};
    pub use crate::error::{Result, StudioError};
    pub use crate::image::providers::GeminiLogoClient;
    pub use crate::image::{GeneratedImage, GenerationRequest, ImageGenerator, ImageResolution};
}
