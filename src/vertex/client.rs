use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::ProviderError,
    provider::{GeneratedImage, GenerativeProvider, ImageRequest, VideoJob, VideoRequest},
};

use super::config::VertexConfig;
use super::wire;

const PROVIDER: &str = "vertex";
const DEFAULT_IMAGE_MIME: &str = "image/png";
const VIDEO_SAMPLE_COUNT: u32 = 1;

/// Vertex AI client for Imagen, Veo and Gemini publisher models.
///
/// Every method performs exactly one HTTP request. Wrap the client in a
/// [`crate::provider::ResilientProvider`] to get quota-aware retries.
///
/// Transport failures, including `timeout_seconds` expiring, surface as
/// [`ProviderError`]s without a status and are classified fatal, so they are
/// not retried. Only 429 / `RESOURCE_EXHAUSTED` responses and quota messages
/// are.
pub struct VertexClient {
    config: VertexConfig,
    client: reqwest::Client,
}

impl VertexClient {
    pub fn new(config: VertexConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::new(PROVIDER, format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: VertexConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &VertexConfig {
        &self.config
    }

    fn log_request_payload<T: Serialize>(&self, label: &str, body: &T) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("{label}: {json}");
        }
    }

    async fn post_json<B, R>(
        &self,
        model: &str,
        method: &str,
        body: &B,
        context: &str,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.exchange(model, method, body, context)
            .await
            .map_err(|err| err.with_provider(PROVIDER))
    }

    async fn exchange<B, R>(
        &self,
        model: &str,
        method: &str,
        body: &B,
        context: &str,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.config.model_url(model, method)?;
        self.log_request_payload(context, body);
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("{context} HTTP status: {status}");
        let text = response.text().await?;
        if !status.is_success() {
            return Err(wire::error_from_response(PROVIDER, status.as_u16(), &text));
        }
        log::trace!("{context} response: {text}");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl GenerativeProvider for VertexClient {
    async fn generate_image(&self, req: &ImageRequest) -> Result<Vec<GeneratedImage>, ProviderError> {
        let body = wire::PredictRequest {
            instances: vec![wire::PromptInstance {
                prompt: &req.prompt,
            }],
            parameters: wire::ImageParameters {
                sample_count: req.sample_count,
                aspect_ratio: req.aspect_ratio.as_deref(),
                negative_prompt: req.negative_prompt.as_deref(),
            },
        };
        let resp: wire::PredictResponse = self
            .post_json(&self.config.image_model, "predict", &body, "Imagen")
            .await?;

        let mut images = Vec::with_capacity(resp.predictions.len());
        let mut filtered = None;
        for prediction in resp.predictions {
            let Some(encoded) = prediction.bytes_base64_encoded else {
                filtered = filtered.or(prediction.rai_filtered_reason);
                continue;
            };
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| ProviderError::decode(PROVIDER, format!("invalid image payload: {e}")))?;
            images.push(GeneratedImage {
                mime_type: prediction
                    .mime_type
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
                bytes,
            });
        }

        if images.is_empty() {
            let reason = filtered.unwrap_or_else(|| "no predictions returned".to_string());
            return Err(ProviderError::new(
                PROVIDER,
                format!("Imagen returned no images: {reason}"),
            ));
        }
        Ok(images)
    }

    async fn generate_video(&self, req: &VideoRequest) -> Result<VideoJob, ProviderError> {
        let body = wire::PredictRequest {
            instances: vec![wire::PromptInstance {
                prompt: &req.prompt,
            }],
            parameters: wire::VideoParameters {
                sample_count: VIDEO_SAMPLE_COUNT,
                duration_seconds: req.duration_seconds,
                aspect_ratio: req.aspect_ratio.as_deref(),
            },
        };
        let resp: wire::OperationResponse = self
            .post_json(&self.config.video_model, "predictLongRunning", &body, "Veo")
            .await?;
        Ok(VideoJob {
            operation: resp.name,
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = wire::GenerateContentRequest {
            contents: vec![wire::Content {
                role: "user",
                parts: vec![wire::TextPart { text: prompt }],
            }],
        };
        let resp: wire::GenerateContentResponse = self
            .post_json(&self.config.text_model, "generateContent", &body, "Gemini")
            .await?;
        resp.first_text()
            .ok_or_else(|| ProviderError::new(PROVIDER, "Gemini returned no text candidates"))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
