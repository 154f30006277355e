//! Text Generation Provider Abstraction
//!
//! Defines the `LlmProvider` trait every text backend implements.
//! Providers return raw model text; callers decide whether to parse JSON.
//!
//! ## Modules
//!
//! - `chain`: Fallback provider chain with classified retries
//! - `gemini`: Google Gemini `generateContent`
//! - `openai`: OpenAI Chat Completions

mod chain;
mod gemini;
mod openai;

pub use chain::{ChainAttempt, ChainConfig, ChainStats, ChainedProvider, ProviderChain};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::LlmConfig;
use crate::types::{
    EngineError, ErrorCategory, ErrorClassifier, LlmError, Result, truncate_chars,
};

// =============================================================================
// LLM Response
// =============================================================================

/// Model output plus usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,
    pub usage: TokenUsage,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
    /// Wall clock time of the request in milliseconds
    pub elapsed_ms: u64,
}

/// Shared provider handle
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Settings for a single provider instance
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "gemini", "openai"
    pub provider: String,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ProviderConfig {
    /// Build the per-provider configs named in `llm.providers`
    ///
    /// The model override only applies to the first provider since model
    /// names are not portable across vendors.
    pub fn from_llm_config(llm: &LlmConfig) -> Vec<ProviderConfig> {
        llm.providers
            .iter()
            .enumerate()
            .map(|(idx, name)| ProviderConfig {
                provider: name.clone(),
                model: if idx == 0 { llm.model.clone() } else { None },
                timeout_secs: llm.timeout_secs,
                temperature: llm.temperature,
                api_key: None,
                api_base: None,
                max_tokens: llm.max_tokens,
            })
            .collect()
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool>;
}

/// Create a provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        other => Err(EngineError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai",
            other
        ))),
    }
}

/// Build a chain from `llm` settings, skipping providers that cannot be
/// constructed (usually a missing API key)
pub fn create_chain(llm: &LlmConfig) -> Result<ProviderChain> {
    let mut chain = ProviderChain::new(ChainConfig {
        max_retries: llm.max_retries,
        ..ChainConfig::default()
    });

    for config in ProviderConfig::from_llm_config(llm) {
        match create_provider(&config) {
            Ok(provider) => chain = chain.add_provider(ChainedProvider::new(provider)),
            Err(e) => warn!(provider = %config.provider, error = %e, "Skipping text provider"),
        }
    }

    if chain.is_empty() {
        return Err(EngineError::Config(
            "No text provider available. Set GEMINI_API_KEY or OPENAI_API_KEY".to_string(),
        ));
    }

    Ok(chain)
}

// =============================================================================
// HTTP helpers shared by the REST providers
// =============================================================================

/// Configured key, else `env_var`; empty values count as missing
pub(crate) fn resolve_api_key(configured: Option<String>, env_var: &str) -> Result<SecretString> {
    configured
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| EngineError::Config(format!("{} is not set", env_var)))
}

/// Configured model, else `env_var`, else `default`
pub(crate) fn resolve_model(configured: Option<String>, env_var: &str, default: &str) -> String {
    configured
        .or_else(|| std::env::var(env_var).ok())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EngineError::LlmApi(format!("HTTP client: {}", e)))
}

/// Send `request`, turning transport errors and non-2xx statuses into
/// classified [`LlmError`]s
pub(crate) async fn send_classified(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ErrorClassifier::classify(&format!("request failed: {}", e), provider))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ErrorClassifier::classify_http_status(
        status.as_u16(),
        &format!("HTTP {}: {}", status, truncate_chars(body.trim(), 500)),
        provider,
    )
    .into())
}

pub(crate) fn parse_failure(provider: &str, message: impl Into<String>) -> EngineError {
    LlmError::with_provider(ErrorCategory::ParseError, message, provider).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_resolve_api_key_prefers_configured() {
        let key = resolve_api_key(Some("sk-configured".into()), "CALYCO_TEST_UNSET_KEY").unwrap();
        assert_eq!(key.expose_secret(), "sk-configured");

        let err = resolve_api_key(Some("  ".into()), "CALYCO_TEST_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("CALYCO_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_resolve_model_default() {
        assert_eq!(resolve_model(None, "CALYCO_TEST_UNSET_MODEL", "m-1"), "m-1");
        assert_eq!(resolve_model(Some("m-2".into()), "CALYCO_TEST_UNSET_MODEL", "m-1"), "m-2");
    }

    #[test]
    fn test_model_override_only_first_provider() {
        let llm = LlmConfig {
            model: Some("gemini-2.0-flash".to_string()),
            ..LlmConfig::default()
        };
        let configs = ProviderConfig::from_llm_config(&llm);
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(configs[1].model, None);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig {
            provider: "openai".into(),
            model: None,
            timeout_secs: 10,
            temperature: 0.5,
            api_key: Some("sk-secret".into()),
            api_base: None,
            max_tokens: 100,
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_unknown_provider() {
        let config = ProviderConfig {
            provider: "nope".into(),
            model: None,
            timeout_secs: 10,
            temperature: 0.5,
            api_key: Some("k".into()),
            api_base: None,
            max_tokens: 100,
        };
        assert!(matches!(create_provider(&config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(100, 50).total(), 150);
    }
}
