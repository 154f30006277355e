//! Engine errors and provider failure classification
//!
//! Every fallible operation returns [`EngineError`]. Provider failures are
//! additionally mapped onto an [`ErrorCategory`], which the text chain uses
//! to decide between retrying, moving to the next provider, or stopping:
//!
//! | Category      | Chain action                   |
//! |---------------|--------------------------------|
//! | `rate_limit`  | wait, retry same provider      |
//! | `network`     | backoff, retry same provider   |
//! | `transient`   | backoff, retry same provider   |
//! | `parse_error` | retry same provider            |
//! | `auth`        | next provider                  |
//! | `token_limit` | next provider                  |
//! | `unavailable` | next provider                  |
//! | `bad_request` | stop                           |

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    TokenLimit,
    Auth,
    Network,
    Unavailable,
    BadRequest,
    /// Model answered but the body was unusable
    ParseError,
    Transient,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::TokenLimit => "token_limit",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Unavailable => "unavailable",
            Self::BadRequest => "bad_request",
            Self::ParseError => "parse_error",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        }
    }

    /// Worth another attempt on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError
        )
    }

    /// Worth moving on to the next provider
    pub fn should_fallback(&self) -> bool {
        matches!(self, Self::TokenLimit | Self::Unavailable | Self::Auth)
    }

    /// Wait before retrying when the provider gave no hint
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_secs(30),
            Self::Network => Duration::from_secs(5),
            Self::Transient => Duration::from_secs(2),
            Self::ParseError => Duration::from_secs(1),
            _ => Duration::from_millis(500),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorized provider failure
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
    /// Explicit wait requested by the provider
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{} ({}): {}", provider, self.category, self.message),
            None => write!(f, "{}: {}", self.category, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::new(category, message)
        }
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.category.recommended_delay())
    }
}

/// Message fragments per category, checked in order
const MESSAGE_RULES: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::RateLimit,
        &["rate limit", "429", "too many requests", "quota", "resource_exhausted"],
    ),
    (
        ErrorCategory::TokenLimit,
        &["token limit", "maximum context", "context length", "too large", "max_tokens"],
    ),
    (
        ErrorCategory::Auth,
        &["api key", "401", "403", "unauthorized", "unauthenticated", "permission denied"],
    ),
    (
        ErrorCategory::Network,
        &["connection", "dns", "timed out", "timeout", "unreachable"],
    ),
    (
        ErrorCategory::Unavailable,
        &["503", "502", "service unavailable", "404", "not found", "model is loading"],
    ),
    (ErrorCategory::BadRequest, &["400", "bad request", "malformed", "invalid argument"]),
    (ErrorCategory::ParseError, &["parse", "json", "empty response"]),
    (ErrorCategory::Transient, &["500", "internal", "overloaded", "temporar"]),
];

/// Maps raw provider failures onto an [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify by message text
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();
        let category = MESSAGE_RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Unknown);

        LlmError::with_provider(category, message, provider)
    }

    /// Classify a non-success HTTP status; the message is kept for display
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            408 => ErrorCategory::Network,
            413 => ErrorCategory::TokenLimit,
            400 | 422 => ErrorCategory::BadRequest,
            404 | 503 => ErrorCategory::Unavailable,
            500..=599 => ErrorCategory::Transient,
            _ => return Self::classify(message, provider),
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify any engine error raised while calling `provider`
    pub fn classify_engine_error(err: &EngineError, provider: &str) -> LlmError {
        let category = match err {
            EngineError::Llm(inner) => {
                return LlmError {
                    provider: Some(provider.to_string()),
                    ..inner.clone()
                };
            }
            // Missing keys surface as config errors when a provider is built lazily
            EngineError::Config(_) => ErrorCategory::Auth,
            EngineError::Http(e) if e.is_timeout() || e.is_connect() => ErrorCategory::Network,
            EngineError::Json(_) => ErrorCategory::ParseError,
            _ => return Self::classify(&err.to_string(), provider),
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Uncategorized provider failure; classified from its message
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Image generation error ({provider}): {message}")]
    Image { provider: String, message: String },

    #[error("Scrape failed for {target}: {message}")]
    Scrape { target: String, message: String },

    #[error("Pipeline step '{step}' failed: {message}")]
    Pipeline { step: String, message: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn pipeline(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn image(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Image {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn scrape(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scrape {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_routing_is_disjoint() {
        let all = [
            ErrorCategory::RateLimit,
            ErrorCategory::TokenLimit,
            ErrorCategory::Auth,
            ErrorCategory::Network,
            ErrorCategory::Unavailable,
            ErrorCategory::BadRequest,
            ErrorCategory::ParseError,
            ErrorCategory::Transient,
            ErrorCategory::Unknown,
        ];
        for category in all {
            assert!(!(category.is_retryable() && category.should_fallback()), "{category}");
        }
        assert!(!ErrorCategory::BadRequest.is_retryable());
        assert!(!ErrorCategory::BadRequest.should_fallback());
    }

    #[test]
    fn test_classify_messages() {
        let cases = [
            ("Rate limit exceeded, please retry", ErrorCategory::RateLimit),
            ("RESOURCE_EXHAUSTED: quota", ErrorCategory::RateLimit),
            ("This model's maximum context length is 8192", ErrorCategory::TokenLimit),
            ("Invalid API key provided", ErrorCategory::Auth),
            ("Connection timed out after 30s", ErrorCategory::Network),
            ("Service unavailable (503)", ErrorCategory::Unavailable),
            ("Model is loading", ErrorCategory::Unavailable),
            ("Upstream overloaded", ErrorCategory::Transient),
            ("Something weird happened", ErrorCategory::Unknown),
        ];
        for (message, expected) in cases {
            assert_eq!(
                ErrorClassifier::classify(message, "gemini").category,
                expected,
                "{message}"
            );
        }
    }

    #[test]
    fn test_classify_http_status() {
        let category = |status| ErrorClassifier::classify_http_status(status, "x", "t").category;

        assert_eq!(category(429), ErrorCategory::RateLimit);
        assert_eq!(category(401), ErrorCategory::Auth);
        assert_eq!(category(413), ErrorCategory::TokenLimit);
        assert_eq!(category(500), ErrorCategory::Transient);
        assert_eq!(category(504), ErrorCategory::Transient);
        assert_eq!(category(503), ErrorCategory::Unavailable);
        assert_eq!(category(418), ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_engine_error() {
        let err = EngineError::Llm(LlmError::new(ErrorCategory::TokenLimit, "prompt too big"));
        let classified = ErrorClassifier::classify_engine_error(&err, "openai");
        assert_eq!(classified.category, ErrorCategory::TokenLimit);
        assert_eq!(classified.provider.as_deref(), Some("openai"));

        let missing_key = EngineError::Config("OPENAI_API_KEY not set".into());
        assert_eq!(
            ErrorClassifier::classify_engine_error(&missing_key, "openai").category,
            ErrorCategory::Auth
        );

        let api = EngineError::LlmApi("503 service unavailable".into());
        assert_eq!(
            ErrorClassifier::classify_engine_error(&api, "down").category,
            ErrorCategory::Unavailable
        );
    }

    #[test]
    fn test_recommended_delay_prefers_hint() {
        let rate_limit = LlmError::new(ErrorCategory::RateLimit, "slow down");
        assert_eq!(rate_limit.recommended_delay(), Duration::from_secs(30));

        let hinted = rate_limit.retry_after(Duration::from_secs(7));
        assert_eq!(hinted.recommended_delay(), Duration::from_secs(7));
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "openai (rate_limit): Too many requests");
        assert_eq!(
            LlmError::new(ErrorCategory::Network, "refused").to_string(),
            "network: refused"
        );
    }
}
