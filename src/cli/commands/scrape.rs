//! Scrape Command
//!
//! Usage:
//!   calyco scrape [--source trends|news|competitors|social|all] [--profile P]...

use clap::ValueEnum;

use crate::cli::{CommandContext, GlobalArgs};
use crate::scrape::{self, SocialScraper};
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScrapeSource {
    Trends,
    News,
    Competitors,
    Social,
    All,
}

impl ScrapeSource {
    fn includes(self, other: ScrapeSource) -> bool {
        self == ScrapeSource::All || self == other
    }
}

pub async fn run(args: &GlobalArgs, source: ScrapeSource, profiles: Vec<String>) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let layout = &ctx.layout;

    if source.includes(ScrapeSource::Trends) {
        let trends = scrape::scrape_trends(layout)?;
        ctx.out.success(&format!(
            "Trends: {} keywords → {}",
            trends.keywords.len(),
            layout.trends_file().display()
        ));
    }

    if source.includes(ScrapeSource::News) {
        let news = scrape::scrape_news(layout)?;
        ctx.out.success(&format!(
            "News: {} items → {}",
            news.len(),
            layout.news_file().display()
        ));
    }

    if source.includes(ScrapeSource::Competitors) {
        let pages = scrape::scrape_competitors(layout)?;
        ctx.out.success(&format!(
            "Competitors: {} pages → {}",
            pages.len(),
            layout.competitors_file().display()
        ));
    }

    if source.includes(ScrapeSource::Social) {
        let profiles = if profiles.is_empty() {
            ctx.config.scrape.profiles.clone()
        } else {
            profiles
        };
        let scraper = SocialScraper::new(&ctx.config.scrape)?;
        for snapshot in scraper.scrape_all(&profiles, layout).await? {
            let line = format!("Social @{}: {}", snapshot.profile, snapshot.status);
            if snapshot.is_ok() {
                ctx.out.success(&line);
            } else {
                ctx.out.warning(&line);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_includes_every_source() {
        assert!(ScrapeSource::All.includes(ScrapeSource::Social));
        assert!(ScrapeSource::News.includes(ScrapeSource::News));
        assert!(!ScrapeSource::News.includes(ScrapeSource::Trends));
    }
}
