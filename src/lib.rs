//! Calyco Content Engine - Marketing Content Pipeline
//!
//! Collects market signals, drafts brand copy with LLMs, illustrates it,
//! checks it, and publishes SEO artifacts plus a static review dashboard.
//!
//! ## Core Features
//!
//! - **Signal Collection**: Trends, news, competitor pages and social profiles
//! - **Provider Chain**: Gemini then OpenAI with classified retries
//! - **Offline Fallbacks**: Every content step still produces output without keys
//! - **Image Chain**: Hugging Face, OpenAI, stock photos, then an SVG placeholder
//! - **Publishing**: JSON-LD, sitemap merge, CSV schedule, HTML dashboard
//!
//! ## Quick Start
//!
//! ```ignore
//! use calyco_engine::{ConfigLoader, Pipeline};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = Pipeline::from_config(config);
//! let report = pipeline.run().await?;
//! println!("{} steps, {} failed", report.steps.len(), report.failed_steps().len());
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Text and image providers, prompt templates, JSON repair
//! - [`scrape`]: Market signal collection into `raw/`
//! - [`generate`]: Web copy, blogs, social posts and ads
//! - [`qc`]: Readability, banned phrases and structure checks
//! - [`seo`]: JSON-LD and sitemap generation
//! - [`dashboard`]: Static HTML review page
//! - [`pipeline`]: Output layout and the end-to-end run

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod export;
pub mod generate;
pub mod pipeline;
pub mod qc;
pub mod scrape;
pub mod seo;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{EngineError, ErrorCategory, Result};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{OutputLayout, Pipeline, RunReport, StepReport, StepStatus};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    ImageOutcome, ImagePipeline, ImageProvider, LlmProvider, LlmResponse, ProviderChain,
    SharedProvider,
};

// =============================================================================
// Stage Re-exports
// =============================================================================

pub use dashboard::build_dashboard;
pub use export::export_social_schedule;
pub use generate::ContentGenerator;
pub use qc::run_quality_checks;
pub use seo::SeoGenerator;
