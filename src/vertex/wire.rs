use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

const BODY_PREVIEW_CHARS: usize = 512;

#[derive(Serialize)]
pub(super) struct PredictRequest<'a, P> {
    pub(super) instances: Vec<PromptInstance<'a>>,
    pub(super) parameters: P,
}

#[derive(Serialize)]
pub(super) struct PromptInstance<'a> {
    pub(super) prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ImageParameters<'a> {
    pub(super) sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) negative_prompt: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VideoParameters<'a> {
    pub(super) sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) aspect_ratio: Option<&'a str>,
}

#[derive(Deserialize)]
pub(super) struct PredictResponse {
    #[serde(default)]
    pub(super) predictions: Vec<ImagePrediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ImagePrediction {
    pub(super) bytes_base64_encoded: Option<String>,
    pub(super) mime_type: Option<String>,
    pub(super) rai_filtered_reason: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct OperationResponse {
    pub(super) name: String,
}

#[derive(Serialize)]
pub(super) struct GenerateContentRequest<'a> {
    pub(super) contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
pub(super) struct Content<'a> {
    pub(super) role: &'a str,
    pub(super) parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
pub(super) struct TextPart<'a> {
    pub(super) text: &'a str,
}

#[derive(Deserialize)]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub(super) candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub(super) struct Candidate {
    pub(super) content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub(super) parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
pub(super) struct CandidatePart {
    pub(super) text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    pub(super) fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Google's error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
    status: Option<String>,
}

/// Builds a [`ProviderError`] from a non-success response, keeping the HTTP
/// status and Google's symbolic status for retry classification.
pub(super) fn error_from_response(provider: &str, status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            ProviderError::http(provider, status, envelope.error.status, envelope.error.message)
        }
        Err(_) => {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            ProviderError::http(provider, status, None, preview)
        }
    }
}
