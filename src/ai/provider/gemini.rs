//! Google Gemini Provider
//!
//! Text generation via the Gemini `generateContent` REST endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, TokenUsage, http_client,
    parse_failure, resolve_api_key, resolve_model, send_classified,
};
use crate::types::{ErrorCategory, LlmError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const PROVIDER_NAME: &str = "gemini";
const KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    /// Never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    generation: GenerationConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// Key from config or `GEMINI_API_KEY`, model from config or `GEMINI_MODEL`
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            api_key: resolve_api_key(config.api_key, "GEMINI_API_KEY")?,
            api_base: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: resolve_model(config.model, "GEMINI_MODEL", DEFAULT_MODEL),
            generation: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(model = %self.model, "Generating with Gemini");
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: &self.generation,
        };
        let response = send_classified(
            self.client
                .post(format!("{}/models/{}:generateContent", self.api_base, self.model))
                .header(KEY_HEADER, self.api_key.expose_secret())
                .json(&request),
            PROVIDER_NAME,
        )
        .await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| parse_failure(PROVIDER_NAME, format!("Gemini response: {}", e)))?;

        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            warn!(%reason, "Gemini blocked the prompt");
            return Err(LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("Prompt blocked: {}", reason),
                PROVIDER_NAME,
            )
            .into());
        }

        let text: String = body
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| &c.parts)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(parse_failure(PROVIDER_NAME, "Empty response from Gemini"));
        }

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();
        debug!(tokens = usage.total(), "Gemini response received");

        Ok(LlmResponse {
            content: text,
            usage,
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER_NAME.to_string(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self
            .client
            .get(format!("{}/models/{}", self.api_base, self.model))
            .header(KEY_HEADER, self.api_key.expose_secret());
        match send_classified(request, PROVIDER_NAME).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Gemini health check failed");
                Ok(false)
            }
        }
    }
}

// Wire types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(api_key: Option<&str>, base: Option<String>) -> ProviderConfig {
        ProviderConfig {
            provider: "gemini".into(),
            model: Some("gemini-test".into()),
            timeout_secs: 5,
            temperature: 0.3,
            api_key: api_key.map(String::from),
            api_base: base,
            max_tokens: 256,
        }
    }

    fn provider(base: String) -> GeminiProvider {
        GeminiProvider::new(config(Some("test-key"), Some(base))).unwrap()
    }

    #[tokio::test]
    async fn test_generate_joins_parts_and_reads_usage() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-test:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .json_body_partial(r#"{"generationConfig": {"maxOutputTokens": 256}}"#);
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "walls"}]}}],
                    "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
                }));
            })
            .await;

        let response = provider(server.base_url()).generate("hi").await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.content, "Hello walls");
        assert_eq!(response.usage.total(), 16);
        assert_eq!(response.metadata.provider, "gemini");
    }

    #[tokio::test]
    async fn test_http_error_is_classified() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).body("quota");
            })
            .await;

        let err = provider(server.base_url()).generate("hi").await.unwrap_err();
        match err {
            EngineError::Llm(e) => {
                assert_eq!(e.category, ErrorCategory::RateLimit);
                assert_eq!(e.provider.as_deref(), Some("gemini"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_bad_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [],
                    "promptFeedback": {"blockReason": "SAFETY"}
                }));
            })
            .await;

        let err = provider(server.base_url()).generate("hi").await.unwrap_err();
        assert!(matches!(err, EngineError::Llm(e) if e.category == ErrorCategory::BadRequest));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = GeminiProvider::new(config(Some(""), None));
        // An empty explicit key falls through to the environment
        if std::env::var("GEMINI_API_KEY").map(|k| k.is_empty()).unwrap_or(true) {
            assert!(matches!(result, Err(EngineError::Config(_))));
        }
    }
}
