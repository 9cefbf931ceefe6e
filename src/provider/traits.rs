use async_trait::async_trait;

use crate::error::ProviderError;

use super::types::{GeneratedImage, ImageRequest, VideoJob, VideoRequest};

/// A generative-AI backend. Each method is one external call; none of them
/// retries on its own.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generates one or more images from a text prompt.
    async fn generate_image(&self, req: &ImageRequest) -> Result<Vec<GeneratedImage>, ProviderError>;

    /// Starts a video generation job and returns its handle.
    async fn generate_video(&self, req: &VideoRequest) -> Result<VideoJob, ProviderError>;

    /// Single-turn text generation.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;
}
