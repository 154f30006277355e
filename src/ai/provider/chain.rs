//! Fallback Provider Chain
//!
//! Cascading provider attempts with classified retries.
//!
//! ## Features
//!
//! - **Rate Limit Aware**: Parses retry-after hints for backoff
//! - **Exponential Backoff**: With random jitter using the `rand` crate
//! - **Error Classification**: Retry the same provider or fall through
//!
//! ## Strategy
//!
//! 1. Try the provider
//! 2. On failure, classify the error
//! 3. If rate-limited, wait for the hinted delay and retry
//! 4. If fallback-eligible (auth, token limit, unavailable), try the next provider
//! 5. Bad requests stop the chain since every provider would reject them
//! 6. Continue until success or all providers are exhausted

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::constants::chain as chain_constants;

use super::{LlmProvider, LlmResponse, SharedProvider};
use crate::types::{EngineError, ErrorCategory, ErrorClassifier, LlmError, Result};

/// Provider entry in a chain
#[derive(Clone)]
pub struct ChainedProvider {
    pub provider: SharedProvider,
}

impl ChainedProvider {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }
}

/// Configuration for the provider chain
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Maximum total attempts across all providers
    pub max_total_attempts: usize,
    /// Retries after the first attempt, per provider
    pub max_retries: u8,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_factor: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_total_attempts: chain_constants::MAX_TOTAL_ATTEMPTS,
            max_retries: chain_constants::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(chain_constants::BASE_DELAY_MS),
            max_delay: Duration::from_secs(chain_constants::MAX_DELAY_SECS),
            backoff_factor: chain_constants::BACKOFF_FACTOR,
        }
    }
}

/// One provider call made by the chain
#[derive(Debug)]
pub struct ChainAttempt {
    pub provider_name: String,
    pub attempt_number: usize,
    pub success: bool,
    pub error: Option<LlmError>,
    pub duration_ms: u64,
}

/// Execution statistics for the chain
#[derive(Debug, Default)]
pub struct ChainStats {
    pub total_attempts: usize,
    pub successful_provider: Option<String>,
    pub attempts: Vec<ChainAttempt>,
    pub total_duration_ms: u64,
}

/// Ordered fallback chain over text providers
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<ChainedProvider>,
    config: ChainConfig,
}

impl ProviderChain {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// Add a provider to the end of the chain
    pub fn add_provider(mut self, provider: ChainedProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in chain order
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.provider.name().to_string())
            .collect()
    }

    /// Execute with fallback across the chain
    #[instrument(skip(self, prompt), fields(providers = self.providers.len()))]
    pub async fn execute(&self, prompt: &str) -> Result<(LlmResponse, ChainStats)> {
        let mut stats = ChainStats::default();
        let start_time = Instant::now();

        if self.providers.is_empty() {
            return Err(EngineError::Config(
                "No providers configured in chain".to_string(),
            ));
        }

        let mut last_error: Option<EngineError> = None;

        'providers: for entry in &self.providers {
            let provider = &entry.provider;
            let provider_name = provider.name().to_string();
            let max_attempts = self.config.max_retries as usize + 1;
            let mut current_delay = self.config.base_delay;

            for attempt in 1..=max_attempts {
                if stats.total_attempts >= self.config.max_total_attempts {
                    warn!(
                        max_attempts = self.config.max_total_attempts,
                        "Chain attempt budget exhausted"
                    );
                    break 'providers;
                }

                stats.total_attempts += 1;
                let attempt_start = Instant::now();

                debug!(
                    total_attempt = stats.total_attempts,
                    provider = %provider_name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    "Chain attempt"
                );

                match provider.generate(prompt).await {
                    Ok(response) => {
                        stats.attempts.push(ChainAttempt {
                            provider_name: provider_name.clone(),
                            attempt_number: attempt,
                            success: true,
                            error: None,
                            duration_ms: attempt_start.elapsed().as_millis() as u64,
                        });
                        stats.successful_provider = Some(provider_name.clone());
                        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

                        info!(
                            provider = %provider_name,
                            attempts = stats.total_attempts,
                            "Chain succeeded"
                        );

                        return Ok((response, stats));
                    }
                    Err(err) => {
                        let classified =
                            ErrorClassifier::classify_engine_error(&err, &provider_name);

                        stats.attempts.push(ChainAttempt {
                            provider_name: provider_name.clone(),
                            attempt_number: attempt,
                            success: false,
                            error: Some(classified.clone()),
                            duration_ms: attempt_start.elapsed().as_millis() as u64,
                        });

                        warn!(
                            provider = %provider_name,
                            attempt = attempt,
                            error = %err,
                            category = %classified.category,
                            "Provider failed"
                        );

                        last_error = Some(err);
                        let has_retry_left = attempt < max_attempts;

                        match classified.category {
                            ErrorCategory::Auth
                            | ErrorCategory::TokenLimit
                            | ErrorCategory::Unavailable => {
                                info!(
                                    provider = %provider_name,
                                    category = %classified.category,
                                    "Trying next provider"
                                );
                                continue 'providers;
                            }
                            ErrorCategory::BadRequest => {
                                warn!("Bad request error, stopping chain");
                                break 'providers;
                            }
                            ErrorCategory::RateLimit => {
                                if has_retry_left {
                                    let wait = classified
                                        .retry_after
                                        .or_else(|| parse_rate_limit_delay(&classified.message))
                                        .unwrap_or_else(|| classified.category.recommended_delay());
                                    info!(
                                        wait_secs = wait.as_secs(),
                                        "Rate limited, waiting before retry"
                                    );
                                    sleep(wait).await;
                                }
                            }
                            ErrorCategory::Network | ErrorCategory::Transient => {
                                if has_retry_left {
                                    let delay = current_delay + random_jitter(current_delay);
                                    debug!(delay_ms = delay.as_millis(), "Retrying after backoff");
                                    sleep(delay).await;
                                    current_delay = calculate_backoff(
                                        current_delay,
                                        self.config.backoff_factor,
                                        self.config.max_delay,
                                    );
                                }
                            }
                            ErrorCategory::ParseError | ErrorCategory::Unknown => {
                                if has_retry_left {
                                    sleep(current_delay).await;
                                }
                            }
                        }
                    }
                }
            }
        }

        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        Err(last_error
            .unwrap_or_else(|| EngineError::LlmApi("All providers in chain failed".to_string())))
    }
}

#[async_trait]
impl LlmProvider for ProviderChain {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        let (response, _stats) = self.execute(prompt).await?;
        Ok(response)
    }

    fn name(&self) -> &str {
        "provider-chain"
    }

    fn model(&self) -> &str {
        self.providers
            .first()
            .map(|p| p.provider.model())
            .unwrap_or("unknown")
    }

    async fn health_check(&self) -> Result<bool> {
        for provider in &self.providers {
            if provider.provider.health_check().await.unwrap_or(false) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Parse rate limit delay from error message
///
/// Extracts retry-after seconds from common rate limit error formats.
fn parse_rate_limit_delay(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let cap = chain_constants::MAX_RATE_LIMIT_WAIT_SECS;

    let first_number = |text: &str| {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_ascii_digit()))
            .find_map(|w| w.parse::<u64>().ok())
    };

    // "retry after N seconds" / "retry-after: N"
    if let Some(idx) = lower.find("retry")
        && let Some(secs) = first_number(&lower[idx..])
    {
        return Some(Duration::from_secs(secs.min(cap)));
    }

    // "wait N seconds" / "in N seconds"
    for pattern in ["wait ", "in "] {
        if let Some(idx) = lower.find(pattern)
            && let Some(secs) = first_number(&lower[idx + pattern.len()..])
        {
            return Some(Duration::from_secs(secs.min(cap)));
        }
    }

    None
}

/// Up to a quarter of `base_delay`
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_jitter_ms))
}

/// Calculate exponential backoff with cap
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::from_secs_f32(current.as_secs_f32() * factor);
    std::cmp::min(next, max)
}
