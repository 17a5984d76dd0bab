//! Content generation boundary — the opaque prompt → text collaborator.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::LlmError;
use crate::funnel::FunnelStage;
use crate::profile::Profile;

use super::prompts::generation_prompt;

/// Opaque, fallible, rate-limited text generator.
///
/// Injected into the wizard engine and copy assembler so the core stays
/// testable with a scripted fake. Implementations must not assume success
/// and may return empty text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate copy for one step of the methodology.
    async fn generate(
        &self,
        profile: &Profile,
        funnel: FunnelStage,
        step: u8,
        content_type: &str,
    ) -> Result<String, LlmError>;
}

/// Production generator backed by the Gemini `generateContent` REST API.
pub struct GeminiGenerator {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    /// Build a generator. The HTTP client carries the explicit per-call
    /// timeout so a hung upstream can never block a request indefinitely.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, config })
    }
}

// ── Wire types for the Gemini API ───────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

// Sampling parameters the marketing team tuned for copy generation.
impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
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
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(
        &self,
        profile: &Profile,
        funnel: FunnelStage,
        step: u8,
        content_type: &str,
    ) -> Result<String, LlmError> {
        let prompt = generation_prompt(profile, funnel, step, content_type);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        debug!(step, funnel = %funnel, content_type, "Requesting generation");

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout: self.config.timeout,
                    }
                } else {
                    LlmError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                reason: format!("Malformed response body: {e}"),
            })?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse {
                reason: "Provider returned no text".to_string(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_api_key_is_rejected() {
        let config = GeminiConfig {
            api_key: secrecy::SecretString::from(""),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert!(matches!(
            GeminiGenerator::new(config),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn response_parsing_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hola "},{"text":"mundo"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hola mundo");
    }

    #[test]
    fn response_without_candidates_parses_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
