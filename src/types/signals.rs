//! Market signal records written by the scrapers and read back as prompt context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Search-interest series for a set of keywords
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub keywords: Vec<String>,
    pub trends: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub keyword: String,
    pub interest: Vec<u32>,
    pub regions: Vec<String>,
}

impl TrendSeries {
    /// Most recent interest value
    pub fn latest(&self) -> Option<u32> {
        self.interest.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorPage {
    pub brand: String,
    pub url: String,
    pub sample_page: String,
}

/// One fetched social profile page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialSnapshot {
    pub profile: String,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    /// `ok`, or `failed: <reason>` when the page could not be fetched
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub html_sample: String,
}

impl SocialSnapshot {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Everything the scrapers produced, as loaded back from disk
#[derive(Debug, Clone, Default)]
pub struct MarketSignals {
    pub trends: TrendReport,
    pub news: Vec<NewsItem>,
    pub competitors: Vec<CompetitorPage>,
}

impl MarketSignals {
    pub fn is_empty(&self) -> bool {
        self.trends.trends.is_empty() && self.news.is_empty() && self.competitors.is_empty()
    }

    /// Compact bullet list used as prompt context
    pub fn prompt_context(&self) -> String {
        let mut out = String::new();

        if !self.trends.trends.is_empty() {
            out.push_str("Rising searches:\n");
            for series in &self.trends.trends {
                match series.latest() {
                    Some(latest) => out.push_str(&format!(
                        "- {} (interest {}, {})\n",
                        series.keyword,
                        latest,
                        series.regions.join("/")
                    )),
                    None => out.push_str(&format!("- {}\n", series.keyword)),
                }
            }
        }

        if !self.news.is_empty() {
            out.push_str("Industry news:\n");
            for item in &self.news {
                out.push_str(&format!("- {} ({}): {}\n", item.title, item.source, item.summary));
            }
        }

        if !self.competitors.is_empty() {
            out.push_str("Competitor topics:\n");
            for page in &self.competitors {
                out.push_str(&format!("- {}: {}\n", page.brand, page.sample_page));
            }
        }

        out
    }
}
