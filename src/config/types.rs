//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! API keys are intentionally absent: they are read from the environment only.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants;
use crate::scrape::is_valid_profile;
use crate::types::{EngineError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    pub brand: BrandConfig,

    pub output: OutputConfig,

    /// Text generation settings
    pub llm: LlmConfig,

    /// Image generation settings
    pub image: ImageConfig,

    pub scrape: ScrapeConfig,

    /// Topics and counts for generated content
    pub content: ContentConfig,

    pub qc: QcConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            brand: BrandConfig::default(),
            output: OutputConfig::default(),
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
            scrape: ScrapeConfig::default(),
            content: ContentConfig::default(),
            qc: QcConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EngineError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 || self.image.timeout_secs == 0 {
            return Err(EngineError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.providers.is_empty() {
            return Err(EngineError::Config(
                "llm.providers must name at least one provider".to_string(),
            ));
        }

        if self.content.social_post_count == 0 || self.content.ads_per_channel == 0 {
            return Err(EngineError::Config(
                "content counts must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.brand.site_url).map_err(|e| {
            EngineError::Config(format!("Invalid brand.site_url '{}': {}", self.brand.site_url, e))
        })?;
        url::Url::parse(&self.scrape.social_base_url).map_err(|e| {
            EngineError::Config(format!(
                "Invalid scrape.social_base_url '{}': {}",
                self.scrape.social_base_url, e
            ))
        })?;

        if let Some(bad) = self.scrape.profiles.iter().find(|p| !is_valid_profile(p)) {
            return Err(EngineError::Config(format!(
                "Invalid scrape profile '{}': use letters, digits, '.', '_' or '-'",
                bad
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Brand
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    pub name: String,
    /// Canonical site root used for JSON-LD and the sitemap
    pub site_url: String,
    /// Phrases flagged by the brand-safety check
    pub banned_phrases: Vec<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: constants::brand::NAME.to_string(),
            site_url: constants::brand::SITE_URL.to_string(),
            banned_phrases: constants::brand::BANNED_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of every generated artifact
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
        }
    }
}

// =============================================================================
// Providers
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Providers tried in order: "gemini", "openai"
    pub providers: Vec<String>,

    /// Model override applied to the first provider
    pub model: Option<String>,

    pub temperature: f32,

    pub max_tokens: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries per provider before falling through
    pub max_retries: u8,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: vec!["gemini".to_string(), "openai".to_string()],
            model: None,
            temperature: 0.7,
            max_tokens: 8192,
            timeout_secs: constants::network::DEFAULT_TIMEOUT_SECS,
            max_retries: constants::chain::DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Providers tried once each, in order: "huggingface", "openai"
    pub providers: Vec<String>,

    pub huggingface_model: String,

    pub openai_model: String,

    /// Copied into place when every provider fails
    pub stock_image: PathBuf,

    pub negative_prompt: String,

    pub guidance_scale: f32,

    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            providers: vec!["huggingface".to_string(), "openai".to_string()],
            huggingface_model: constants::image::HF_DEFAULT_MODEL.to_string(),
            openai_model: constants::image::OPENAI_DEFAULT_MODEL.to_string(),
            stock_image: PathBuf::from(constants::image::STOCK_IMAGE),
            negative_prompt: constants::image::NEGATIVE_PROMPT.to_string(),
            guidance_scale: constants::image::GUIDANCE_SCALE,
            timeout_secs: constants::image::TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Scraping
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Social profiles fetched by `scrape --source social`
    pub profiles: Vec<String>,

    pub social_base_url: String,

    /// Characters of raw HTML kept per profile
    pub html_sample_chars: usize,

    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            profiles: constants::scrape::DEFAULT_PROFILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            social_base_url: constants::scrape::SOCIAL_BASE_URL.to_string(),
            html_sample_chars: constants::scrape::HTML_SAMPLE_CHARS,
            timeout_secs: constants::scrape::TIMEOUT_SECS,
            user_agent: constants::scrape::USER_AGENT.to_string(),
        }
    }
}

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Product page topic
    pub web_copy_topic: String,

    pub blog_topic: String,

    /// Target article length
    pub blog_words: usize,

    pub social_post_count: usize,

    /// Ads requested per channel
    pub ads_per_channel: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            web_copy_topic: "Interior Emulsion Paints".to_string(),
            blog_topic: "Trending Home Paint Colors 2025".to_string(),
            blog_words: 1200,
            social_post_count: 10,
            ads_per_channel: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub min_words: usize,
    pub min_headings: usize,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            min_words: constants::qc::MIN_WORDS,
            min_headings: constants::qc::MIN_HEADINGS,
        }
    }
}
