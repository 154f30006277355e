//! Generated content records
//!
//! These are the shapes written under the output tree and read back by the
//! SEO generator, the exporter and the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of page an SEO artifact is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Blog,
    Web,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Blog => write!(f, "blog"),
            ContentKind::Web => write!(f, "web"),
        }
    }
}

/// Minimal view of a page needed for JSON-LD and the sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
}

/// Product page copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebCopy {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub why_calyco: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    /// Markdown rendition of the page, used for quality checks
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// True when the copy was substituted locally after a provider failure
    #[serde(default)]
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

impl WebCopy {
    pub fn summary(&self) -> PageSummary {
        let description = if self.meta_description.is_empty() {
            self.description.clone()
        } else {
            self.meta_description.clone()
        };
        PageSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            description,
            kind: ContentKind::Web,
        }
    }

    /// Render the structured fields as markdown
    pub fn render_body(&self) -> String {
        let mut body = format!("# {}\n\n", self.title);
        if !self.subtitle.is_empty() {
            body.push_str(&format!("{}\n\n", self.subtitle));
        }
        if !self.description.is_empty() {
            body.push_str(&format!("{}\n\n", self.description));
        }
        if !self.features.is_empty() {
            body.push_str("## Features\n\n");
            for feature in &self.features {
                body.push_str(&format!("- {}\n", feature));
            }
            body.push('\n');
        }
        if !self.usage.is_empty() {
            body.push_str(&format!("## How to Use\n\n{}\n\n", self.usage));
        }
        if !self.why_calyco.is_empty() {
            body.push_str(&format!("## Why Calyco\n\n{}\n", self.why_calyco));
        }
        body
    }
}

/// Long-form blog article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Markdown article
    pub body: String,
    #[serde(default)]
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn summary(&self) -> PageSummary {
        PageSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind: ContentKind::Blog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub platform: String,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Ad copy for one channel; which fields are set depends on the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSnippet {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AdSnippet {
    /// Most descriptive text available: description, then text, then headline
    pub fn display_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.text.as_deref())
            .or(self.headline.as_deref())
    }
}

/// Output of the quality checks for one piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcReport {
    pub readability_score: f64,
    pub brand_violations: Vec<String>,
    pub seo_issues: Vec<String>,
    pub word_count: usize,
    pub passed: bool,
}
