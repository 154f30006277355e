//! Generate Command
//!
//! Generates content from whatever signals are already under `raw/`.
//!
//! Usage:
//!   calyco generate <web-copy|blog|social|ads|all>

use clap::ValueEnum;
use std::sync::Arc;

use crate::cli::{CommandContext, GlobalArgs};
use crate::generate::ContentGenerator;
use crate::pipeline::text_provider;
use crate::scrape::load_signals;
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenerateTarget {
    WebCopy,
    Blog,
    Social,
    Ads,
    All,
}

impl GenerateTarget {
    fn includes(self, other: GenerateTarget) -> bool {
        self == GenerateTarget::All || self == other
    }
}

fn origin(fallback: bool) -> &'static str {
    if fallback { "fallback" } else { "generated" }
}

pub async fn run(args: &GlobalArgs, target: GenerateTarget) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let signals = load_signals(&ctx.layout);
    if signals.is_empty() {
        ctx.out.warning("No scraped signals found; run `calyco scrape` for richer prompts");
    }

    let generator = ContentGenerator::new(
        Arc::new(text_provider(&ctx.config.llm)),
        ctx.config.brand.clone(),
        ctx.config.content.clone(),
        ctx.layout.clone(),
    );

    if target.includes(GenerateTarget::WebCopy) {
        let copy = generator.web_copy(&signals).await?;
        ctx.out.success(&format!(
            "Web copy ({}): {}",
            origin(copy.fallback),
            ctx.layout.web_copy_file(&copy.slug).display()
        ));
    }

    if target.includes(GenerateTarget::Blog) {
        let post = generator.blog(&signals).await?;
        ctx.out.success(&format!(
            "Blog ({}): {}",
            origin(post.fallback),
            ctx.layout.blog_file(&post.slug).display()
        ));
    }

    if target.includes(GenerateTarget::Social) {
        let posts = generator.social_posts(&signals).await?;
        ctx.out.success(&format!(
            "Social posts: {} → {}",
            posts.len(),
            ctx.layout.social_posts_file().display()
        ));
    }

    if target.includes(GenerateTarget::Ads) {
        let ads = generator.ads(&signals).await?;
        ctx.out.success(&format!(
            "Ad snippets: {} → {}",
            ads.len(),
            ctx.layout.ads_file().display()
        ));
    }

    Ok(())
}
