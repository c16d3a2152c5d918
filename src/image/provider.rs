//! Image generator trait.

use crate::error::Result;
use crate::image::types::GenerationRequest;
use async_trait::async_trait;

/// Something that turns a [`GenerationRequest`] into an image data URI.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Issues one generation and returns a `data:image/png;base64,...` URI.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Returns the model identifier, for display.
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: ImageGenerator + ?Sized> ImageGenerator for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
