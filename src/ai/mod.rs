//! AI service integration for delegated image editing
//!
//! Provides the image edit interface used by the branding pipeline, an
//! OpenAI Images implementation and a scriptable mock.

pub mod mock;
pub mod openai;

pub use mock::MockImageEditClient;
pub use openai::OpenAiImageEditClient;

use crate::image::PreparedImage;
use crate::Result;
use async_trait::async_trait;

/// Result of one edit call. `url` is either a vendor-hosted link or a
/// `data:` URL built from inline image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub url: String,
}

#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Run one prompt-guided edit (inpainting) over `image` and its mask.
    async fn edit_image(&self, image: &PreparedImage, prompt: &str) -> Result<EditedImage>;

    /// Download the bytes behind an edit result URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
