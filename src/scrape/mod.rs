//! Market Signal Scrapers
//!
//! Trends, news and competitor data are seeded demo sources written to
//! `raw/`. Social profiles are fetched over HTTP by [`SocialScraper`].
//! [`load_signals`] reads everything back as prompt context.

mod social;

pub use social::{SocialScraper, is_valid_profile};

use tracing::{info, warn};

use crate::pipeline::{OutputLayout, read_json_opt, write_json};
use crate::types::{
    CompetitorPage, MarketSignals, NewsItem, Result, TrendReport, TrendSeries,
};

const TREND_KEYWORDS: &[&str] = &[
    "home painting ideas",
    "interior wall paint",
    "trending paint colors",
];
const TREND_INTEREST: &[u32] = &[50, 60, 55, 70, 80];
const TREND_REGIONS: &[&str] = &["India", "USA"];

pub fn demo_trends() -> TrendReport {
    TrendReport {
        keywords: TREND_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        trends: TREND_KEYWORDS
            .iter()
            .map(|keyword| TrendSeries {
                keyword: keyword.to_string(),
                interest: TREND_INTEREST.to_vec(),
                regions: TREND_REGIONS.iter().map(|r| r.to_string()).collect(),
            })
            .collect(),
    }
}

pub fn demo_news() -> Vec<NewsItem> {
    vec![
        NewsItem {
            title: "New low-VOC trends emerging in 2025".into(),
            source: "Paint Weekly".into(),
            summary: "Low-VOC and eco-friendly emulsions are dominating market demand.".into(),
        },
        NewsItem {
            title: "Texture wall paints rising in popularity".into(),
            source: "Home Decor Times".into(),
            summary: "Consumers shifting toward texture-based accent walls.".into(),
        },
    ]
}

pub fn demo_competitors() -> Vec<CompetitorPage> {
    vec![
        CompetitorPage {
            brand: "Asian Paints".into(),
            url: "https://www.asianpaints.com".into(),
            sample_page: "Top texture ideas for modern homes".into(),
        },
        CompetitorPage {
            brand: "Birla Opus".into(),
            url: "https://www.birlaopus.com".into(),
            sample_page: "Why low-odour paints matter".into(),
        },
    ]
}

pub fn scrape_trends(layout: &OutputLayout) -> Result<TrendReport> {
    let report = demo_trends();
    let path = layout.trends_file();
    write_json(&path, &report)?;
    info!(keywords = report.keywords.len(), path = %path.display(), "Trends scraped");
    Ok(report)
}

pub fn scrape_news(layout: &OutputLayout) -> Result<Vec<NewsItem>> {
    let news = demo_news();
    let path = layout.news_file();
    write_json(&path, &news)?;
    info!(items = news.len(), path = %path.display(), "Industry news scraped");
    Ok(news)
}

pub fn scrape_competitors(layout: &OutputLayout) -> Result<Vec<CompetitorPage>> {
    let pages = demo_competitors();
    let path = layout.competitors_file();
    write_json(&path, &pages)?;
    info!(pages = pages.len(), path = %path.display(), "Competitor pages scraped");
    Ok(pages)
}

/// Read scraped signals back; missing or unreadable files become empty
pub fn load_signals(layout: &OutputLayout) -> MarketSignals {
    fn load<T: serde::de::DeserializeOwned + Default>(path: &std::path::Path) -> T {
        match read_json_opt(path) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable signal file");
                T::default()
            }
        }
    }

    MarketSignals {
        trends: load(&layout.trends_file()),
        news: load(&layout.news_file()),
        competitors: load(&layout.competitors_file()),
    }
}
