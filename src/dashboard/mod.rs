//! Static Dashboard
//!
//! Collects whatever the pipeline left in the output tree and renders a
//! single `dashboard.html` next to it. Links are relative to the output root
//! so the page works when the directory is moved or served as-is.

mod render;

pub use render::render_dashboard;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{self, dashboard as limits};
use crate::pipeline::{OutputLayout, list_files};
use crate::types::{AdSnippet, ContentKind, QcReport, SocialPost, WebCopy, truncate_chars};

#[derive(Debug, Clone, PartialEq)]
pub enum CardBody {
    Text(String),
    Pre(String),
}

/// One entry on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub body: CardBody,
    pub tags: Vec<String>,
    /// Relative link to the source file
    pub link: Option<String>,
    /// Relative link to a thumbnail
    pub thumb: Option<String>,
}

impl Card {
    fn new(title: impl Into<String>, body: CardBody) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            body,
            tags: Vec::new(),
            link: None,
            thumb: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub brand: String,
    pub generated_at: DateTime<Utc>,
    pub web_copy: Vec<Card>,
    pub blogs: Vec<Card>,
    pub social: Vec<Card>,
    pub ads: Vec<Card>,
    pub qc: Vec<Card>,
    pub raw: Vec<Card>,
    pub images: Vec<String>,
    pub jsonld: Vec<Card>,
    pub sitemap: Option<String>,
}

fn read_text(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            None
        }
    }
}

fn read_value<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let text = read_text(path)?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping malformed JSON");
            None
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Walks the output tree and builds the dashboard model
pub struct DashboardBuilder {
    layout: OutputLayout,
    brand: String,
    images: Vec<PathBuf>,
}

impl DashboardBuilder {
    pub fn new(layout: OutputLayout, brand: impl Into<String>) -> Self {
        let images = list_files(&layout.images_dir(), constants::image::EXTENSIONS);
        Self {
            layout,
            brand: brand.into(),
            images,
        }
    }

    fn link(&self, path: &Path) -> String {
        self.layout.relative(path)
    }

    /// First image whose file stem is `slug`
    fn thumb_for(&self, slug: &str) -> Option<String> {
        self.images
            .iter()
            .find(|p| stem(p) == slug)
            .map(|p| self.link(p))
    }

    pub fn gather(&self) -> DashboardData {
        DashboardData {
            brand: self.brand.clone(),
            generated_at: Utc::now(),
            web_copy: self.web_copy(),
            blogs: self.blogs(),
            social: self.social(),
            ads: self.ads(),
            qc: self.qc(),
            raw: self.raw(),
            images: self.images.iter().map(|p| self.link(p)).collect(),
            jsonld: self.jsonld(),
            sitemap: self
                .layout
                .sitemap_file()
                .is_file()
                .then(|| self.link(&self.layout.sitemap_file())),
        }
    }

    fn web_copy(&self) -> Vec<Card> {
        list_files(&self.layout.web_copy_dir(), &["json"])
            .into_iter()
            .filter_map(|path| {
                let copy: WebCopy = read_value(&path)?;
                let mut card = Card::new(&copy.title, CardBody::Text(copy.description.clone()));
                card.subtitle = copy.subtitle.clone();
                card.tags = copy.features.clone();
                card.thumb = match copy.image.as_deref() {
                    Some(image) if self.layout.root().join(image).is_file() => {
                        Some(image.to_string())
                    }
                    _ => self.thumb_for(&copy.slug),
                };
                card.link = Some(self.link(&path));
                Some(card)
            })
            .collect()
    }

    fn blogs(&self) -> Vec<Card> {
        list_files(&self.layout.blogs_dir(), &["md"])
            .into_iter()
            .filter_map(|path| {
                let text = read_text(&path)?;
                let head = truncate_chars(&text, limits::BLOG_READ_CHARS);
                let (title, excerpt) = blog_card_text(head, &stem(&path));

                let mut card = Card::new(title, CardBody::Text(excerpt));
                card.thumb = self.thumb_for(&stem(&path));
                card.link = Some(self.link(&path));
                Some(card)
            })
            .collect()
    }

    fn social(&self) -> Vec<Card> {
        let path = self.layout.social_posts_file();
        let posts: Vec<SocialPost> = read_value(&path).unwrap_or_default();
        posts
            .into_iter()
            .map(|post| {
                let mut card = Card::new(post.platform, CardBody::Text(post.caption));
                card.tags = post.hashtags;
                card.link = Some(self.link(&path));
                card
            })
            .collect()
    }

    fn ads(&self) -> Vec<Card> {
        let path = self.layout.ads_file();
        let items: Vec<Value> = read_value(&path).unwrap_or_default();
        items
            .into_iter()
            .map(|item| {
                let (channel, text) = ad_card_text(&item);
                let mut card = Card::new(channel, CardBody::Text(text));
                card.link = Some(self.link(&path));
                card
            })
            .collect()
    }

    fn qc(&self) -> Vec<Card> {
        [ContentKind::Web, ContentKind::Blog]
            .into_iter()
            .filter_map(|kind| {
                let path = self.layout.qc_file(kind);
                if !path.is_file() {
                    return None;
                }
                let report: QcReport = read_value(&path)?;

                let mut findings = format!(
                    "Readability: {:.2}\nWords: {}",
                    report.readability_score, report.word_count
                );
                for violation in &report.brand_violations {
                    findings.push_str(&format!("\nBanned phrase: {}", violation));
                }
                for issue in &report.seo_issues {
                    findings.push_str(&format!("\n{}", issue));
                }

                let mut card = Card::new(file_name(&path), CardBody::Pre(findings));
                card.subtitle = if report.passed { "Passed" } else { "Needs review" }.to_string();
                card.link = Some(self.link(&path));
                Some(card)
            })
            .collect()
    }

    fn raw(&self) -> Vec<Card> {
        list_files(&self.layout.raw_dir(), &["json"])
            .into_iter()
            .filter_map(|path| {
                let text = read_text(&path)?;
                let snippet = truncate_chars(&text, limits::RAW_SNIPPET_CHARS).to_string();
                let mut card = Card::new(file_name(&path), CardBody::Pre(snippet));
                card.link = Some(self.link(&path));
                Some(card)
            })
            .collect()
    }

    fn jsonld(&self) -> Vec<Card> {
        [ContentKind::Blog, ContentKind::Web]
            .into_iter()
            .flat_map(|kind| list_files(&self.layout.jsonld_dir(kind), &["json"]))
            .filter_map(|path| {
                let value: Value = read_value(&path)?;
                let pretty = serde_json::to_string_pretty(&value).ok()?;
                let snippet = truncate_chars(&pretty, limits::JSONLD_SNIPPET_CHARS).to_string();
                let mut card = Card::new(file_name(&path), CardBody::Pre(snippet));
                card.link = Some(self.link(&path));
                Some(card)
            })
            .collect()
    }
}

/// Title from a leading `#` line (else `fallback`), excerpt from the second
/// non-empty line
fn blog_card_text(head: &str, fallback: &str) -> (String, String) {
    let lines: Vec<&str> = head
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines
        .first()
        .filter(|l| l.starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    let excerpt = lines
        .get(1)
        .map(|l| truncate_chars(l, limits::EXCERPT_CHARS).to_string())
        .unwrap_or_default();

    (title, excerpt)
}

/// Channel and best available copy: description, text, headline, raw JSON
fn ad_card_text(item: &Value) -> (String, String) {
    match serde_json::from_value::<AdSnippet>(item.clone()) {
        Ok(ad) => {
            let text = ad
                .display_text()
                .map(str::to_string)
                .unwrap_or_else(|| item.to_string());
            (ad.channel, text)
        }
        Err(_) => ("n/a".to_string(), item.to_string()),
    }
}

/// Gather, render and write `dashboard.html`
pub fn build_dashboard(layout: &OutputLayout, brand: &str) -> crate::types::Result<PathBuf> {
    let data = DashboardBuilder::new(layout.clone(), brand).gather();
    let html = render_dashboard(&data);

    let path = layout.dashboard_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, html)?;

    info!(
        path = %path.display(),
        blogs = data.blogs.len(),
        images = data.images.len(),
        "Dashboard written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::write_json;
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, OutputLayout) {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        (dir, layout)
    }

    #[test]
    fn test_blog_card_text() {
        let (title, excerpt) = blog_card_text("\n# Colours of 2025\n\nWarm neutrals.\n", "slug");
        assert_eq!(title, "Colours of 2025");
        assert_eq!(excerpt, "Warm neutrals.");

        let (title, excerpt) = blog_card_text("No heading here", "slug");
        assert_eq!(title, "slug");
        assert!(excerpt.is_empty());
    }

    #[test]
    fn test_ad_card_text_order() {
        assert_eq!(
            ad_card_text(&json!({"channel": "Google", "headline": "H", "text": "T"})),
            ("Google".to_string(), "T".to_string())
        );
        let (_, raw) = ad_card_text(&json!({"channel": "Facebook"}));
        assert!(raw.contains("Facebook"));
    }

    #[test]
    fn test_empty_tree_gathers_nothing() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("missing"));
        let data = DashboardBuilder::new(layout, "Calyco").gather();

        assert!(data.web_copy.is_empty());
        assert!(data.images.is_empty());
        assert!(data.sitemap.is_none());
    }

    #[test]
    fn test_gather_links_thumbs_and_skips_bad_files() {
        let (_dir, layout) = seeded();
        fs::write(layout.images_dir().join("colours.png"), b"\x89PNG").unwrap();
        fs::write(layout.images_dir().join("notes.txt"), b"x").unwrap();
        fs::write(layout.blog_file("colours"), "# Colours\n\nExcerpt line.\n").unwrap();
        fs::write(layout.ads_file(), "[{\"channel\": \"WhatsApp\", \"text\": \"Hi\"}]").unwrap();
        fs::write(layout.social_posts_file(), "not json").unwrap();
        write_json(&layout.trends_file(), &json!({"keywords": ["x"]})).unwrap();

        let data = DashboardBuilder::new(layout.clone(), "Calyco").gather();

        assert_eq!(data.images, vec!["images/colours.png"]);
        assert_eq!(data.blogs[0].thumb.as_deref(), Some("images/colours.png"));
        assert_eq!(data.blogs[0].link.as_deref(), Some("blogs/colours.md"));
        assert_eq!(data.ads[0].body, CardBody::Text("Hi".to_string()));
        assert!(data.social.is_empty());
        assert_eq!(data.raw[0].title, "google_trends.json");
    }

    #[test]
    fn test_web_copy_thumb_follows_linked_image() {
        let (_dir, layout) = seeded();
        fs::write(layout.images_dir().join("hero.png"), b"\x89PNG").unwrap();
        fs::write(layout.images_dir().join("hero.svg"), "<svg/>").unwrap();
        let copy = json!({
            "slug": "hero",
            "title": "Hero",
            "image": "images/hero.svg",
            "generated_at": "2025-03-14T00:00:00Z",
        });
        write_json(&layout.web_copy_file("hero"), &copy).unwrap();

        let data = DashboardBuilder::new(layout.clone(), "Calyco").gather();
        assert_eq!(data.web_copy[0].thumb.as_deref(), Some("images/hero.svg"));

        // A link to a missing file falls back to the slug match
        fs::remove_file(layout.images_dir().join("hero.svg")).unwrap();
        let data = DashboardBuilder::new(layout, "Calyco").gather();
        assert_eq!(data.web_copy[0].thumb.as_deref(), Some("images/hero.png"));
    }

    #[test]
    fn test_build_dashboard_writes_html() {
        let (_dir, layout) = seeded();
        write_json(
            &layout.qc_file(ContentKind::Blog),
            &QcReport {
                readability_score: 55.5,
                brand_violations: vec!["llm".into()],
                seo_issues: vec![],
                word_count: 420,
                passed: false,
            },
        )
        .unwrap();

        let path = build_dashboard(&layout, "Calyco").unwrap();
        let html = fs::read_to_string(path).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("blog_qc.json"));
        assert!(html.contains("Banned phrase: llm"));
        assert!(html.contains("Needs review"));
    }
}
