//! Gemini `generateContent` client.
//!
//! Sends the assembled parts as one user turn with a JSON response schema
//! and returns the model's raw text. No retries.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use facegate_core::{Part, ScanRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("facegate/", env!("CARGO_PKG_VERSION"));
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {0}: {1}")]
    Api(u16, String),
    #[error("unexpected response envelope: {0}")]
    Envelope(String),
    #[error("model returned no text{}", block_suffix(.0))]
    EmptyResponse(Option<String>),
}

fn block_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// Anything that can turn an assembled request into raw verdict text.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn generate(&self, request: &ScanRequest) -> Result<String, ServiceError>;
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn to_wire(request: &ScanRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart::Text { text: text.clone() },
            Part::Image(img) => WirePart::Inline {
                inline_data: InlineData {
                    mime_type: img.mime_type.clone(),
                    data: STANDARD.encode(&img.data),
                },
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE,
            response_schema: request.response_schema.clone(),
        },
    }
}

/// Concatenate the first candidate's text parts.
fn extract_text(response: GenerateContentResponse) -> Result<String, ServiceError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = response.prompt_feedback.and_then(|f| f.block_reason);
        return Err(ServiceError::EmptyResponse(reason));
    }
    Ok(text)
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &crate::Config) -> Result<Self, ServiceError> {
        Self::new(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base_url.clone(),
            config.request_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl InferenceService for GeminiClient {
    async fn generate(&self, request: &ScanRequest) -> Result<String, ServiceError> {
        let body = to_wire(request);

        tracing::debug!(
            model = %self.model,
            parts = request.parts.len(),
            images = request.image_count(),
            payload_bytes = request.payload_bytes(),
            "calling generateContent"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api(status.as_u16(), error_text));
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Envelope(e.to_string()))?;

        extract_text(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_core::{assemble, Gallery, ImagePayload};
    use serde_json::json;

    #[test]
    fn test_wire_body_shape() {
        let probe = ImagePayload::new(vec![0xFF, 0xD8], "image/jpeg");
        let req = assemble(&Gallery::default(), probe);
        let body = serde_json::to_value(to_wire(&req)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 4);
        assert!(parts[0]["text"].as_str().unwrap().starts_with("CONTEXT:"));
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["inlineData"]["data"], "/9g=");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"status\":" }, { "text": "\"BLOCK: SPOOF\"}" }]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), r#"{"status":"BLOCK: SPOOF"}"#);
    }

    #[test]
    fn test_extract_text_blocked() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err();
        assert_eq!(err.to_string(), "model returned no text (blocked: SAFETY)");
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(
            "k",
            "gemini-2.5-flash",
            "http://localhost:9",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/models/gemini-2.5-flash:generateContent"
        );
    }
}
