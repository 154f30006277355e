//! SEO Artifacts
//!
//! schema.org JSON-LD per page and a sitemap covering every page seen.
//! Blog pages live under `<site>/blog/<slug>`, product pages under
//! `<site>/<slug>`.

pub mod sitemap;

pub use sitemap::{ChangeFreq, SitemapEntry};

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::BrandConfig;
use crate::generate::{blog_description, blog_title};
use crate::pipeline::{OutputLayout, list_files, read_json, write_json};
use crate::types::{ContentKind, PageSummary, Result, WebCopy};

const SITEMAP_PRIORITY: f32 = 0.8;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical URL of a page
pub fn page_url(site_url: &str, kind: ContentKind, slug: &str) -> String {
    let site = site_url.trim_end_matches('/');
    match kind {
        ContentKind::Blog => format!("{}/blog/{}", site, slug),
        ContentKind::Web => format!("{}/{}", site, slug),
    }
}

/// schema.org `Article` with the brand as author and publisher
pub fn jsonld_article(
    brand: &BrandConfig,
    slug: &str,
    title: &str,
    description: &str,
    published: NaiveDate,
) -> Value {
    let organization = json!({"@type": "Organization", "name": brand.name});
    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": title,
        "description": description,
        "author": organization,
        "publisher": organization,
        "mainEntityOfPage": page_url(&brand.site_url, ContentKind::Blog, slug),
        "datePublished": published.format(DATE_FORMAT).to_string(),
    })
}

/// schema.org page of `schema_type` (usually `Product`) for product copy
pub fn jsonld_web_page(
    brand: &BrandConfig,
    slug: &str,
    title: &str,
    description: &str,
    schema_type: &str,
    published: NaiveDate,
) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": schema_type,
        "name": title,
        "description": description,
        "brand": {"@type": "Brand", "name": brand.name},
        "mainEntityOfPage": page_url(&brand.site_url, ContentKind::Web, slug),
        "datePublished": published.format(DATE_FORMAT).to_string(),
    })
}

/// Pages already generated under the output tree
///
/// Web copy comes from `web_copy/*.json`, blogs from `blogs/*.md`.
/// Unreadable files are skipped.
pub fn discover_pages(layout: &OutputLayout) -> Vec<PageSummary> {
    let mut pages = Vec::new();

    for path in list_files(&layout.web_copy_dir(), &["json"]) {
        match read_json::<WebCopy>(&path) {
            Ok(copy) => pages.push(copy.summary()),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable web copy"),
        }
    }

    for path in list_files(&layout.blogs_dir(), &["md"]) {
        let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(markdown) => pages.push(PageSummary {
                title: blog_title(&markdown).unwrap_or_else(|| slug.clone()),
                description: blog_description(&markdown),
                slug,
                kind: ContentKind::Blog,
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable blog"),
        }
    }

    pages
}

pub struct SeoGenerator {
    layout: OutputLayout,
    brand: BrandConfig,
    today: NaiveDate,
    entries: Vec<SitemapEntry>,
}

impl SeoGenerator {
    pub fn new(layout: OutputLayout, brand: BrandConfig) -> Self {
        Self {
            layout,
            brand,
            today: Utc::now().date_naive(),
            entries: Vec::new(),
        }
    }

    /// Fix the publication and lastmod date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }

    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    /// Write the page's JSON-LD and register it for the sitemap
    pub fn generate_schema(&mut self, page: &PageSummary) -> Result<PathBuf> {
        let schema = match page.kind {
            ContentKind::Blog => jsonld_article(
                &self.brand,
                &page.slug,
                &page.title,
                &page.description,
                self.today,
            ),
            ContentKind::Web => jsonld_web_page(
                &self.brand,
                &page.slug,
                &page.title,
                &page.description,
                "Product",
                self.today,
            ),
        };

        let path = self.layout.jsonld_file(page.kind, &page.slug);
        write_json(&path, &schema)?;
        info!(kind = %page.kind, slug = %page.slug, "JSON-LD written");

        let loc = page_url(&self.brand.site_url, page.kind, &page.slug);
        self.entries.retain(|e| e.loc != loc);
        self.entries.push(SitemapEntry {
            loc,
            lastmod: Some(self.today.format(DATE_FORMAT).to_string()),
            changefreq: Some(ChangeFreq::Weekly),
            priority: Some(SITEMAP_PRIORITY),
        });

        Ok(path)
    }

    /// Rewrite `sitemap.xml` with registered entries plus any already listed
    ///
    /// Carried entries keep their `changefreq` and `priority`; legacy entries
    /// without them get the same weekly / 0.8 defaults as fresh pages.
    pub fn generate_sitemap(&self) -> Result<PathBuf> {
        let path = self.layout.sitemap_file();

        let existing: Vec<SitemapEntry> = match fs::read_to_string(&path) {
            Ok(xml) => sitemap::parse_entries(&xml)
                .into_iter()
                .map(|entry| SitemapEntry {
                    changefreq: entry.changefreq.or(Some(ChangeFreq::Weekly)),
                    priority: entry.priority.or(Some(SITEMAP_PRIORITY)),
                    ..entry
                })
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(existing = existing.len(), fresh = self.entries.len(), "Merging sitemap");

        let merged = sitemap::merge_entries(existing, &self.entries);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, sitemap::render(&merged))?;

        info!(urls = merged.len(), path = %path.display(), "Sitemap written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn page(slug: &str, kind: ContentKind) -> PageSummary {
        PageSummary {
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            description: "Desc".to_string(),
            kind,
        }
    }

    #[test]
    fn test_jsonld_article_shape() {
        let value = jsonld_article(&BrandConfig::default(), "colours-2025", "Colours", "D", date());

        assert_eq!(value["@type"], "Article");
        assert_eq!(value["author"]["@type"], "Organization");
        assert_eq!(value["publisher"]["name"], "Calyco");
        assert_eq!(
            value["mainEntityOfPage"],
            "https://calycopaints.com/blog/colours-2025"
        );
        assert_eq!(value["datePublished"], "2025-03-14");
    }

    #[test]
    fn test_jsonld_web_page_shape() {
        let brand = BrandConfig {
            site_url: "https://example.com/".to_string(),
            ..BrandConfig::default()
        };
        let value = jsonld_web_page(&brand, "emulsion", "Emulsion", "D", "Product", date());

        assert_eq!(value["@type"], "Product");
        assert_eq!(value["brand"]["@type"], "Brand");
        assert_eq!(value["mainEntityOfPage"], "https://example.com/emulsion");
    }

    #[test]
    fn test_schema_and_sitemap_written() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let mut seo = SeoGenerator::new(layout.clone(), BrandConfig::default()).with_date(date());

        let blog_path = seo.generate_schema(&page("colours", ContentKind::Blog)).unwrap();
        seo.generate_schema(&page("emulsion", ContentKind::Web)).unwrap();
        seo.generate_schema(&page("emulsion", ContentKind::Web)).unwrap();
        assert_eq!(seo.entries().len(), 2);
        assert_eq!(blog_path, layout.jsonld_file(ContentKind::Blog, "colours"));

        let sitemap = fs::read_to_string(seo.generate_sitemap().unwrap()).unwrap();
        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert!(sitemap.contains("<lastmod>2025-03-14</lastmod>"));
        assert!(sitemap.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_sitemap_merges_previous_runs() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        fs::write(
            layout.sitemap_file(),
            "<?xml version=\"1.0\"?>\n<urlset>\n  <url>\n    <loc>https://calycopaints.com/blog/old</loc>\n  </url>\n  <url>\n    <loc>https://calycopaints.com/blog/colours</loc>\n  </url>\n",
        )
        .unwrap();

        let mut seo = SeoGenerator::new(layout.clone(), BrandConfig::default()).with_date(date());
        seo.generate_schema(&page("colours", ContentKind::Blog)).unwrap();
        let sitemap = fs::read_to_string(seo.generate_sitemap().unwrap()).unwrap();

        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert!(sitemap.contains("/blog/old</loc>"));
        assert_eq!(sitemap.matches("<changefreq>weekly</changefreq>").count(), 2);
        assert_eq!(sitemap.matches("/blog/colours</loc>").count(), 1);
    }

    #[test]
    fn test_rerun_keeps_changefreq_and_priority_on_carried_pages() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());

        let mut first = SeoGenerator::new(layout.clone(), BrandConfig::default()).with_date(date());
        first.generate_schema(&page("colours", ContentKind::Blog)).unwrap();
        first.generate_sitemap().unwrap();

        let mut second = SeoGenerator::new(layout, BrandConfig::default()).with_date(date());
        second.generate_schema(&page("emulsion", ContentKind::Web)).unwrap();
        let sitemap = fs::read_to_string(second.generate_sitemap().unwrap()).unwrap();

        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert_eq!(sitemap.matches("<changefreq>weekly</changefreq>").count(), 2);
        assert_eq!(sitemap.matches("<priority>0.8</priority>").count(), 2);
    }

    #[test]
    fn test_discover_pages_reads_outputs() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        fs::write(
            layout.blog_file("colours"),
            "# Colours of 2025\n\nWarm neutrals lead the year.\n",
        )
        .unwrap();
        fs::write(layout.web_copy_file("broken"), "{not json").unwrap();

        let pages = discover_pages(&layout);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Colours of 2025");
        assert_eq!(pages[0].description, "Warm neutrals lead the year.");
        assert_eq!(pages[0].kind, ContentKind::Blog);
    }
}
