//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Brand defaults
pub mod brand {
    /// Brand name used in prompts, JSON-LD and the dashboard
    pub const NAME: &str = "Calyco";

    /// Public site root for canonical URLs
    pub const SITE_URL: &str = "https://calycopaints.com";

    /// Phrases that must never appear in published copy
    pub const BANNED_PHRASES: &[&str] = &[
        "ai-generated",
        "ai generated",
        "chatgpt",
        "llm",
        "machine-generated",
        "artificial intelligence generated",
    ];
}

/// Provider chain constants
pub mod chain {
    /// Maximum total attempts across all providers
    pub const MAX_TOTAL_ATTEMPTS: usize = 6;

    /// Default maximum retries per provider
    pub const DEFAULT_MAX_RETRIES: u8 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Upper bound on a rate-limit wait parsed from an error message (seconds)
    pub const MAX_RATE_LIMIT_WAIT_SECS: u64 = 300;
}

/// Image generation constants
pub mod image {
    /// Hugging Face inference router base
    pub const HF_ROUTER_BASE: &str = "https://router.huggingface.co/hf-inference/models";

    /// Default Stable Diffusion model
    pub const HF_DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

    /// Default OpenAI image model
    pub const OPENAI_DEFAULT_MODEL: &str = "gpt-image-1";

    /// Negative prompt sent with every diffusion request
    pub const NEGATIVE_PROMPT: &str = "blurry, distorted, low quality";

    /// Classifier-free guidance scale
    pub const GUIDANCE_SCALE: f32 = 7.0;

    /// Per-request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 60;

    /// Stock image copied when every provider fails
    pub const STOCK_IMAGE: &str = "assets/placeholder.jpg";

    /// Extensions an image under `images/` may carry
    pub const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "svg"];
}

/// Scraping constants
pub mod scrape {
    /// Social profiles fetched by default
    pub const DEFAULT_PROFILES: &[&str] = &["asianpaints", "bergerpaints", "indigopaints"];

    /// Social network base URL
    pub const SOCIAL_BASE_URL: &str = "https://www.instagram.com";

    /// Characters of raw HTML kept per snapshot
    pub const HTML_SAMPLE_CHARS: usize = 2000;

    /// Page fetch timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 20;

    pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
}

/// Quality control constants
pub mod qc {
    /// Minimum words for SEO-ready content
    pub const MIN_WORDS: usize = 300;

    /// Minimum number of markdown headings
    pub const MIN_HEADINGS: usize = 2;

    /// Readability returned when a score cannot be computed
    pub const FALLBACK_READABILITY: f64 = 60.0;
}

/// Dashboard constants
pub mod dashboard {
    /// Characters of a blog read for title and excerpt
    pub const BLOG_READ_CHARS: usize = 2000;

    /// Maximum excerpt length shown on a blog card
    pub const EXCERPT_CHARS: usize = 300;

    /// Characters of a raw scraper file shown
    pub const RAW_SNIPPET_CHARS: usize = 800;

    /// Characters of a JSON-LD file shown
    pub const JSONLD_SNIPPET_CHARS: usize = 1000;
}

/// HTTP/Network constants
pub mod network {
    /// Default text generation timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
