//! End-to-End Pipeline
//!
//! Runs every step in program order against one output tree:
//! scrape → generate → images → QC → SEO → export → dashboard.
//! A failing step is recorded in the run report and later steps still run,
//! working from whatever earlier steps managed to produce.

mod layout;
mod report;

pub use layout::{OutputLayout, list_files, read_json, read_json_opt, write_json};
pub use report::{RunReport, StepReport, StepStatus};

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::{
    ChainConfig, ImagePipeline, PromptTemplates, ProviderChain, SharedProvider, create_chain,
};
use crate::config::{Config, LlmConfig};
use crate::dashboard::build_dashboard;
use crate::export::export_social_schedule;
use crate::generate::ContentGenerator;
use crate::qc::run_quality_checks;
use crate::scrape::{self, SocialScraper};
use crate::seo::SeoGenerator;
use crate::types::{BlogPost, ContentKind, MarketSignals, Result, SocialPost, WebCopy};

/// What a step reports back on success
struct StepOutcome {
    status: StepStatus,
    detail: String,
}

impl StepOutcome {
    fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Ok,
            detail: detail.into(),
        }
    }

    fn fallback(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Fallback,
            detail: detail.into(),
        }
    }

    fn skipped(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Skipped,
            detail: detail.into(),
        }
    }

    /// `fallback` when `is_fallback`, else `ok`
    fn with_fallback(is_fallback: bool, detail: impl Into<String>) -> Self {
        if is_fallback {
            Self::fallback(detail)
        } else {
            Self::ok(detail)
        }
    }
}

/// Text provider chain from `llm`, or an empty chain when no provider is
/// usable so every piece of copy comes from the local fallbacks
pub fn text_provider(llm: &LlmConfig) -> ProviderChain {
    create_chain(llm).unwrap_or_else(|e| {
        warn!(error = %e, "No text provider available, content will use fallbacks");
        ProviderChain::new(ChainConfig::default())
    })
}

/// Content carried between steps
#[derive(Default)]
struct RunState {
    signals: MarketSignals,
    web_copy: Option<WebCopy>,
    blog: Option<BlogPost>,
    social_posts: Vec<SocialPost>,
}

pub struct Pipeline {
    config: Config,
    layout: OutputLayout,
    generator: ContentGenerator,
    images: ImagePipeline,
}

impl Pipeline {
    pub fn new(config: Config, provider: SharedProvider, images: ImagePipeline) -> Self {
        let layout = OutputLayout::new(&config.output.dir);
        let generator = ContentGenerator::new(
            provider,
            config.brand.clone(),
            config.content.clone(),
            layout.clone(),
        );
        Self {
            config,
            layout,
            generator,
            images,
        }
    }

    /// Text and image providers built from `config`
    pub fn from_config(config: Config) -> Self {
        let provider = Arc::new(text_provider(&config.llm));
        let layout = OutputLayout::new(&config.output.dir);
        let images = ImagePipeline::from_config(&config.image, layout.images_dir());
        Self::new(config, provider, images)
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run every step and write `run_report.json`
    pub async fn run(&self) -> Result<RunReport> {
        self.layout.ensure_dirs()?;
        let mut report = RunReport::start();
        let mut state = RunState::default();
        info!(run_id = %report.run_id, output = %self.layout.root().display(), "Pipeline started");

        // Scrape
        record(&mut report, "scrape_trends", async {
            let trends = scrape::scrape_trends(&self.layout)?;
            Ok(StepOutcome::ok(format!("{} keywords", trends.keywords.len())))
        })
        .await;
        record(&mut report, "scrape_news", async {
            let news = scrape::scrape_news(&self.layout)?;
            Ok(StepOutcome::ok(format!("{} items", news.len())))
        })
        .await;
        record(&mut report, "scrape_competitors", async {
            let pages = scrape::scrape_competitors(&self.layout)?;
            Ok(StepOutcome::ok(format!("{} pages", pages.len())))
        })
        .await;
        record(&mut report, "scrape_social", self.scrape_social()).await;
        state.signals = scrape::load_signals(&self.layout);

        // Generate
        let web_copy = record_value(&mut report, "generate_web_copy", async {
            let copy = self.generator.web_copy(&state.signals).await?;
            let outcome = StepOutcome::with_fallback(copy.fallback, copy.slug.clone());
            Ok((copy, outcome))
        })
        .await;
        state.web_copy = web_copy;

        let blog = record_value(&mut report, "generate_blog", async {
            let post = self.generator.blog(&state.signals).await?;
            let outcome = StepOutcome::with_fallback(post.fallback, post.slug.clone());
            Ok((post, outcome))
        })
        .await;
        state.blog = blog;

        let posts = record_value(&mut report, "generate_social", async {
            let posts = self.generator.social_posts(&state.signals).await?;
            let outcome = StepOutcome::ok(format!("{} posts", posts.len()));
            Ok((posts, outcome))
        })
        .await;
        state.social_posts = posts.unwrap_or_default();

        record(&mut report, "generate_ads", async {
            let ads = self.generator.ads(&state.signals).await?;
            Ok(StepOutcome::ok(format!("{} snippets", ads.len())))
        })
        .await;

        // Images
        if let Some(copy) = state.web_copy.as_mut() {
            record(&mut report, "image_web_copy", self.web_copy_image(copy)).await;
        } else {
            report.push("image_web_copy", StepStatus::Skipped, "no web copy");
        }
        if let Some(post) = state.blog.as_ref() {
            record(&mut report, "image_blog", self.blog_image(post)).await;
        } else {
            report.push("image_blog", StepStatus::Skipped, "no blog");
        }

        // Quality, SEO, export, dashboard
        record(&mut report, "quality_checks", async { self.quality_checks(&state) }).await;
        record(&mut report, "seo", async { self.seo(&state) }).await;
        record(&mut report, "export_schedule", async {
            let rows = export_social_schedule(
                &state.social_posts,
                Utc::now().date_naive(),
                &self.layout.schedule_file(),
            )?;
            Ok(StepOutcome::ok(format!("{} rows", rows)))
        })
        .await;
        record(&mut report, "dashboard", async {
            let path = build_dashboard(&self.layout, &self.config.brand.name)?;
            Ok(StepOutcome::ok(self.layout.relative(&path)))
        })
        .await;

        report.finish();
        write_json(&self.layout.run_report_file(), &report)?;
        info!(
            run_id = %report.run_id,
            failed = report.failed_steps().len(),
            "Pipeline finished"
        );
        Ok(report)
    }

    async fn scrape_social(&self) -> Result<StepOutcome> {
        let profiles = &self.config.scrape.profiles;
        if profiles.is_empty() {
            return Ok(StepOutcome::skipped("no profiles configured"));
        }

        let scraper = SocialScraper::new(&self.config.scrape)?;
        let snapshots = scraper.scrape_all(profiles, &self.layout).await?;
        let fetched = snapshots.iter().filter(|s| s.is_ok()).count();
        let detail = format!("{}/{} profiles fetched", fetched, snapshots.len());

        Ok(StepOutcome::with_fallback(fetched < snapshots.len(), detail))
    }

    /// Generate the hero image and link it from the saved web copy
    async fn web_copy_image(&self, copy: &mut WebCopy) -> Result<StepOutcome> {
        let outcome = self
            .images
            .generate(&PromptTemplates::image(&copy.title), &copy.slug)
            .await?;
        copy.image = Some(self.layout.relative(&outcome.path));
        self.generator.save_web_copy(copy)?;

        Ok(StepOutcome::with_fallback(
            outcome.is_fallback(),
            format!("{} ({})", outcome.file_name(), outcome.source),
        ))
    }

    /// Blog images are matched to their article by slug on the dashboard
    async fn blog_image(&self, post: &BlogPost) -> Result<StepOutcome> {
        let outcome = self
            .images
            .generate(&PromptTemplates::image(&post.title), &post.slug)
            .await?;

        Ok(StepOutcome::with_fallback(
            outcome.is_fallback(),
            format!("{} ({})", outcome.file_name(), outcome.source),
        ))
    }

    fn quality_checks(&self, state: &RunState) -> Result<StepOutcome> {
        let targets = [
            (ContentKind::Web, state.web_copy.as_ref().map(|c| c.body.as_str())),
            (ContentKind::Blog, state.blog.as_ref().map(|b| b.body.as_str())),
        ];

        let mut checked = Vec::new();
        for (kind, body) in targets {
            let Some(body) = body else { continue };
            let qc = run_quality_checks(body, &self.config.brand, &self.config.qc);
            write_json(&self.layout.qc_file(kind), &qc)?;
            info!(
                %kind,
                passed = qc.passed,
                readability = qc.readability_score,
                "Quality checks written"
            );
            checked.push(format!("{}: {}", kind, if qc.passed { "passed" } else { "issues" }));
        }

        if checked.is_empty() {
            return Ok(StepOutcome::skipped("no content to check"));
        }
        Ok(StepOutcome::ok(checked.join(", ")))
    }

    fn seo(&self, state: &RunState) -> Result<StepOutcome> {
        let mut seo = SeoGenerator::new(self.layout.clone(), self.config.brand.clone());

        let pages = state
            .web_copy
            .iter()
            .map(WebCopy::summary)
            .chain(state.blog.iter().map(BlogPost::summary));
        for page in pages {
            seo.generate_schema(&page)?;
        }
        seo.generate_sitemap()?;

        Ok(StepOutcome::ok(format!("{} pages", seo.entries().len())))
    }
}

/// Await `step`, log it and append its report
async fn record<F>(report: &mut RunReport, name: &str, step: F)
where
    F: Future<Output = Result<StepOutcome>>,
{
    record_value(report, name, async { step.await.map(|o| ((), o)) }).await;
}

/// Like [`record`] but hands the step's value back on success
async fn record_value<T, F>(report: &mut RunReport, name: &str, step: F) -> Option<T>
where
    F: Future<Output = Result<(T, StepOutcome)>>,
{
    match step.await {
        Ok((value, outcome)) => {
            info!(step = name, status = %outcome.status, detail = %outcome.detail, "Step finished");
            report.push(name, outcome.status, outcome.detail);
            Some(value)
        }
        Err(e) => {
            warn!(step = name, error = %e, "Step failed, continuing");
            report.push(name, StepStatus::Failed, e.to_string());
            None
        }
    }
}
