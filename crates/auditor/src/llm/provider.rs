//! AI provider abstraction and the Gemini wire client.
//!
//! The credential check happens at construction, before any request can
//! be sent. No error is retried automatically: a transport failure fails
//! the submission on the first attempt unless extra attempts were
//! explicitly configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::llm::request::{AuditRequest, RequestPart};

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends the assembled request and returns the model's raw text,
    /// expected to be a JSON document matching the result schema.
    async fn generate(&self, request: &AuditRequest) -> Result<String, AuditError>;

    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
}

impl GeminiProvider {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AuditError::Configuration(
                "No AI API key configured (set AEGIS_API_KEY or GEMINI_API_KEY)".to_string(),
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_retries: config.retry_attempts.max(1),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn wire_body(request: &AuditRequest) -> GenerateBody {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                RequestPart::Text(text) => WirePart::Text { text: text.clone() },
                RequestPart::InlineData { mime_type, data } => WirePart::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect();

        GenerateBody {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
            },
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String, AuditError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| {
                AuditError::InvalidResponse("No content in model response".to_string())
            })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(&self, request: &AuditRequest) -> Result<String, AuditError> {
        let body = Self::wire_body(request);
        debug!(
            "Sending {} part(s) to {} at temperature {}",
            request.parts.len(),
            self.model,
            request.temperature
        );

        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            debug!("API call attempt {}/{}", attempt, self.max_retries);

            let result = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await;

            let error_text = match result {
                Ok(response) if response.status().is_success() => break response,
                Ok(response) => {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    format!("AI service returned HTTP {}: {}", status, detail)
                }
                Err(e) => format!("AI request failed: {}", e),
            };

            warn!("AI API error (attempt {}): {}", attempt, error_text);
            if attempt >= self.max_retries {
                return Err(AuditError::Upstream(error_text));
            }

            let wait = if error_text.contains("429") || error_text.to_lowercase().contains("rate")
            {
                Duration::from_secs(2_u64.pow(attempt))
            } else {
                Duration::from_millis(100 * attempt as u64)
            };
            tokio::time::sleep(wait).await;
        };

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(format!("AI response malformed: {}", e)))?;

        let text = Self::extract_text(parsed)?;
        debug!("Received {} bytes of model output", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
