//! Hugging Face Inference Router Provider
//!
//! Text-to-image via `POST {router}/{model}`. The router answers either with
//! raw image bytes (`image/*` content type) or with JSON carrying a base64
//! `generated_image` field, depending on the backend serving the model.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{GeneratedImage, ImageFormat, ImageProvider};
use crate::config::ImageConfig;
use crate::constants::image as image_constants;
use crate::types::{EngineError, ErrorClassifier, Result};

const PROVIDER_NAME: &str = "huggingface";

pub struct HuggingFaceProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    negative_prompt: String,
    guidance_scale: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HuggingFaceProvider {
    pub fn new(api_key: impl Into<String>, config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::image(PROVIDER_NAME, format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            api_base: image_constants::HF_ROUTER_BASE.to_string(),
            model: config.huggingface_model.clone(),
            negative_prompt: config.negative_prompt.clone(),
            guidance_scale: config.guidance_scale,
            client,
        })
    }

    /// Key from `HF_API_KEY`, else `HF_TOKEN`
    pub fn from_env(config: &ImageConfig) -> Result<Self> {
        let key = ["HF_API_KEY", "HF_TOKEN"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|k| !k.is_empty())
            .ok_or_else(|| {
                EngineError::Config(
                    "Hugging Face key not found. Set HF_API_KEY or HF_TOKEN".to_string(),
                )
            })?;
        Self::new(key, config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn classify(&self, status: u16, body: &str) -> EngineError {
        let classified = ErrorClassifier::classify_http_status(status, body, PROVIDER_NAME);
        EngineError::image(
            PROVIDER_NAME,
            format!("HTTP {} [{}]: {}", status, classified.category, body),
        )
    }
}

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
    inputs: &'a str,
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct Parameters<'a> {
    negative_prompt: &'a str,
    guidance_scale: f32,
}

#[async_trait]
impl ImageProvider for HuggingFaceProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        info!(model = %self.model, "Generating image with Hugging Face");
        let url = format!("{}/{}", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&TextToImageRequest {
                inputs: prompt,
                parameters: Parameters {
                    negative_prompt: &self.negative_prompt,
                    guidance_scale: self.guidance_scale,
                },
            })
            .send()
            .await
            .map_err(|e| EngineError::image(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify(status.as_u16(), &body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::image(PROVIDER_NAME, e.to_string()))?;

        if let Some(format) = ImageFormat::from_content_type(&content_type) {
            debug!(bytes = bytes.len(), %content_type, "Received raw image");
            return Ok(GeneratedImage {
                bytes: bytes.to_vec(),
                format,
            });
        }

        let body: Value = serde_json::from_slice(&bytes)?;
        let encoded = body
            .get("generated_image")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::image(PROVIDER_NAME, "Response missing image"))?;
        let decoded = BASE64
            .decode(encoded)
            .map_err(|e| EngineError::image(PROVIDER_NAME, format!("Invalid base64: {}", e)))?;

        Ok(GeneratedImage::new(decoded))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const MODEL_PATH: &str = "/stabilityai/stable-diffusion-xl-base-1.0";

    fn provider(server: &MockServer) -> HuggingFaceProvider {
        HuggingFaceProvider::new("hf-test", &ImageConfig::default())
            .unwrap()
            .with_api_base(server.base_url())
    }

    #[tokio::test]
    async fn test_raw_image_bytes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MODEL_PATH)
                    .header("Authorization", "Bearer hf-test")
                    .json_body_partial(r#"{"parameters": {"guidance_scale": 7.0}}"#);
                then.status(200)
                    .header("content-type", "image/jpeg")
                    .body([0xFF, 0xD8, 0xFF, 0xE0]);
            })
            .await;

        let image = provider(&server).generate("teal bedroom").await.unwrap();
        mock.assert_async().await;
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!(image.bytes.len(), 4);
    }

    #[tokio::test]
    async fn test_base64_json_image() {
        let server = MockServer::start_async().await;
        let encoded = BASE64.encode([0x89, b'P', b'N', b'G']);
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(json!({ "generated_image": encoded }));
            })
            .await;

        let image = provider(&server).generate("teal bedroom").await.unwrap();
        assert_eq!(image.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_missing_image_field_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(json!({ "error": "queue full" }));
            })
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, EngineError::Image { .. }));
    }

    #[tokio::test]
    async fn test_loading_model_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(503).body("Model is loading");
            })
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
