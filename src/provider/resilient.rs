use crate::{
    error::{InvokeError, ProviderError},
    resilient_invoker::{ResilienceConfig, ResilientInvoker, StructuredQuota},
};

use super::traits::GenerativeProvider;
use super::types::{GeneratedImage, ImageRequest, VideoJob, VideoRequest};

/// Resilient wrapper that routes every provider call through one shared
/// [`ResilientInvoker`], so image, video and text calls all back off the
/// same way on rate-limit rejections.
pub struct ResilientProvider {
    inner: Box<dyn GenerativeProvider>,
    invoker: ResilientInvoker<StructuredQuota>,
}

impl ResilientProvider {
    /// Creates a new resilient wrapper around an existing provider.
    pub fn new(inner: Box<dyn GenerativeProvider>, cfg: ResilienceConfig) -> Self {
        let invoker = ResilientInvoker::new(cfg)
            .with_classifier(StructuredQuota)
            .with_label("generative");
        Self::with_invoker(inner, invoker)
    }

    pub fn with_invoker(
        inner: Box<dyn GenerativeProvider>,
        invoker: ResilientInvoker<StructuredQuota>,
    ) -> Self {
        Self { inner, invoker }
    }

    pub fn invoker(&self) -> &ResilientInvoker<StructuredQuota> {
        &self.invoker
    }

    pub fn inner(&self) -> &dyn GenerativeProvider {
        self.inner.as_ref()
    }

    pub async fn generate_image(
        &self,
        req: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, InvokeError<ProviderError>> {
        self.invoker.invoke(|| self.inner.generate_image(req)).await
    }

    pub async fn generate_video(
        &self,
        req: &VideoRequest,
    ) -> Result<VideoJob, InvokeError<ProviderError>> {
        self.invoker.invoke(|| self.inner.generate_video(req)).await
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String, InvokeError<ProviderError>> {
        self.invoker.invoke(|| self.inner.generate_text(prompt)).await
    }
}

#[cfg(test)]
#[path = "resilient_tests.rs"]
mod tests;
