//! OpenAI Image Provider
//!
//! `POST /images/generations`, reading the first `b64_json` payload.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::{GeneratedImage, ImageProvider};
use crate::config::ImageConfig;
use crate::types::{EngineError, ErrorClassifier, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai";
const IMAGE_SIZE: &str = "1024x1024";

pub struct OpenAiImageProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiImageProvider {
    pub fn new(api_key: impl Into<String>, config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::image(PROVIDER_NAME, format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            api_base: DEFAULT_API_BASE.to_string(),
            model: config.openai_model.clone(),
            client,
        })
    }

    pub fn from_env(config: &ImageConfig) -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                EngineError::Config("OpenAI API key not found. Set OPENAI_API_KEY".to_string())
            })?;
        Self::new(key, config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    /// Only the DALL·E models accept this; gpt-image models always return base64
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        info!(model = %self.model, "Generating image with OpenAI");
        let url = format!("{}/images/generations", self.api_base);

        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: self.model.starts_with("dall-e").then_some("b64_json"),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::image(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let classified =
                ErrorClassifier::classify_http_status(status.as_u16(), &body, PROVIDER_NAME);
            return Err(EngineError::image(
                PROVIDER_NAME,
                format!("HTTP {} [{}]: {}", status.as_u16(), classified.category, body),
            ));
        }

        let body: ImageResponse = response.json().await?;
        let encoded = body
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| EngineError::image(PROVIDER_NAME, "Response missing b64_json"))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| EngineError::image(PROVIDER_NAME, format!("Invalid base64: {}", e)))?;

        Ok(GeneratedImage::new(bytes))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::image::ImageFormat;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_decodes_b64_payload() {
        let server = MockServer::start_async().await;
        let encoded = BASE64.encode([0xFF, 0xD8, 0xFF, 0xDB]);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/images/generations")
                    .header("Authorization", "Bearer sk-img")
                    .json_body_partial(r#"{"model": "gpt-image-1", "n": 1}"#);
                then.status(200)
                    .json_body(json!({ "data": [{ "b64_json": encoded }] }));
            })
            .await;

        let provider = OpenAiImageProvider::new("sk-img", &ImageConfig::default())
            .unwrap()
            .with_api_base(server.base_url());
        let image = provider.generate("sage green kitchen").await.unwrap();

        mock.assert_async().await;
        assert_eq!(image.format, ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_http_error_is_image_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/images/generations");
                then.status(400).body("content policy");
            })
            .await;

        let provider = OpenAiImageProvider::new("sk-img", &ImageConfig::default())
            .unwrap()
            .with_api_base(server.base_url());
        let err = provider.generate("x").await.unwrap_err();
        assert!(matches!(err, EngineError::Image { ref provider, .. } if provider == "openai"));
    }
}
