//! OpenAI Chat Completions provider
//!
//! Second link in the default text chain.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, TokenUsage, http_client,
    parse_failure, resolve_api_key, resolve_model, send_classified,
};
use crate::types::Result;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROVIDER_NAME: &str = "openai";

const SYSTEM_PROMPT: &str = "You are a senior copywriter for a paint brand. \
Follow the requested output format exactly and never mention how the text was produced.";

pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    /// Key from config or `OPENAI_API_KEY`, model from config or `OPENAI_MODEL`
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            api_key: resolve_api_key(config.api_key, "OPENAI_API_KEY")?,
            api_base: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: resolve_model(config.model, "OPENAI_MODEL", DEFAULT_MODEL),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(model = %self.model, temperature = self.temperature, "Generating with OpenAI");
        let start = Instant::now();

        let response = send_classified(
            self.client
                .post(format!("{}/chat/completions", self.api_base))
                .bearer_auth(self.api_key.expose_secret())
                .json(&self.request(prompt)),
            PROVIDER_NAME,
        )
        .await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| parse_failure(PROVIDER_NAME, format!("OpenAI response: {}", e)))?;

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        let content = body
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| parse_failure(PROVIDER_NAME, "Empty response from OpenAI"))?;

        debug!(tokens = usage.total(), "OpenAI response received");

        Ok(LlmResponse {
            content,
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
            .get(format!("{}/models", self.api_base))
            .bearer_auth(self.api_key.expose_secret());
        match send_classified(request, PROVIDER_NAME).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "OpenAI health check failed");
                Ok(false)
            }
        }
    }
}

// Wire types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngineError, ErrorCategory};
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider(base: String) -> OpenAiProvider {
        OpenAiProvider::new(ProviderConfig {
            provider: "openai".into(),
            model: Some("gpt-test".into()),
            timeout_secs: 5,
            temperature: 0.2,
            api_key: Some("sk-test".into()),
            api_base: Some(base),
            max_tokens: 128,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_reads_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .json_body_partial(r#"{"model": "gpt-test", "max_tokens": 128}"#);
                then.status(200).json_body(json!({
                    "choices": [{"message": {"content": "Fresh walls"}}],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 3}
                }));
            })
            .await;

        let response = provider(server.base_url()).generate("write").await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.content, "Fresh walls");
        assert_eq!(response.usage, TokenUsage::new(10, 3));
        assert_eq!(response.metadata.model, "gpt-test");
    }

    #[tokio::test]
    async fn test_auth_failure_is_classified() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("bad key");
            })
            .await;

        let err = provider(server.base_url()).generate("write").await.unwrap_err();
        assert!(matches!(err, EngineError::Llm(e) if e.category == ErrorCategory::Auth));
    }

    #[tokio::test]
    async fn test_empty_choice_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let err = provider(server.base_url()).generate("write").await.unwrap_err();
        assert!(matches!(err, EngineError::Llm(e) if e.category == ErrorCategory::ParseError));
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models");
                then.status(503);
            })
            .await;

        assert!(!provider(server.base_url()).health_check().await.unwrap());
    }
}
