use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{ConfigError, ProviderError};

const DEFAULT_LOCATION: &str = "us-central1";
const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";
const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Connection settings for Vertex AI publisher models.
#[derive(Debug, Clone, Deserialize)]
pub struct VertexConfig {
    pub project: String,
    #[serde(default = "default_location")]
    pub location: String,
    /// OAuth access token sent as a bearer credential
    pub access_token: SecretString,
    /// Overrides `https://{location}-aiplatform.googleapis.com`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: Option<u64>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_video_model() -> String {
    DEFAULT_VIDEO_MODEL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_timeout() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_SECONDS)
}

impl VertexConfig {
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: default_location(),
            access_token: SecretString::new(access_token.into()),
            base_url: None,
            image_model: default_image_model(),
            video_model: default_video_model(),
            text_model: default_text_model(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(input)?;
        if cfg.project.trim().is_empty() {
            return Err(ConfigError::Invalid("project must not be empty".to_string()));
        }
        Ok(cfg)
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn video_model(mut self, model: impl Into<String>) -> Self {
        self.video_model = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn timeout_seconds(mut self, timeout: Option<u64>) -> Self {
        self.timeout_seconds = timeout;
        self
    }

    pub(super) fn model_url(&self, model: &str, method: &str) -> Result<reqwest::Url, ProviderError> {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        };
        let raw = format!(
            "{base}/v1/projects/{}/locations/{}/publishers/google/models/{model}:{method}",
            self.project, self.location
        );
        reqwest::Url::parse(&raw)
            .map_err(|e| ProviderError::new("vertex", format!("invalid endpoint {raw}: {e}")))
    }
}
