//! Social profile page fetcher
//!
//! One GET per profile with a browser user agent. The page title and
//! `og:description` are pulled out with `scraper`; the head of the raw HTML is
//! kept as a sample. Fetch failures produce a `failed: ...` snapshot instead
//! of an error so the run carries on.

use chrono::Utc;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::pipeline::{OutputLayout, write_json};
use crate::types::{EngineError, Result, SocialSnapshot, truncate_chars};

/// Handles are ASCII letters, digits, `.`, `_` and `-`; no dot segments
pub fn is_valid_profile(profile: &str) -> bool {
    !profile.is_empty()
        && !profile.starts_with('.')
        && !profile.contains("..")
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

pub struct SocialScraper {
    client: reqwest::Client,
    base_url: String,
    sample_chars: usize,
}

impl SocialScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| EngineError::scrape("social", format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.social_base_url.trim_end_matches('/').to_string(),
            sample_chars: config.html_sample_chars,
        })
    }

    pub fn profile_url(&self, profile: &str) -> String {
        format!("{}/{}/", self.base_url, profile)
    }

    /// Fetch one profile; never fails
    pub async fn scrape_profile(&self, profile: &str) -> SocialSnapshot {
        let url = self.profile_url(profile);
        let fetched = if is_valid_profile(profile) {
            self.fetch(&url).await
        } else {
            Err(EngineError::scrape(profile, "invalid profile name"))
        };

        match fetched {
            Ok(html) => {
                let page = PageMeta::parse(&html);
                info!(profile, bytes = html.len(), "Social profile fetched");
                SocialSnapshot {
                    profile: profile.to_string(),
                    url,
                    fetched_at: Utc::now(),
                    status: "ok".to_string(),
                    title: page.title,
                    description: page.description,
                    html_sample: truncate_chars(&html, self.sample_chars).to_string(),
                }
            }
            Err(e) => {
                warn!(profile, error = %e, "Social profile fetch failed");
                SocialSnapshot {
                    profile: profile.to_string(),
                    url,
                    fetched_at: Utc::now(),
                    status: format!("failed: {}", e),
                    title: None,
                    description: None,
                    html_sample: String::new(),
                }
            }
        }
    }

    /// Fetch every profile and write `raw/<profile>_social.json`
    pub async fn scrape_all(
        &self,
        profiles: &[String],
        layout: &OutputLayout,
    ) -> Result<Vec<SocialSnapshot>> {
        if let Some(bad) = profiles.iter().find(|p| !is_valid_profile(p)) {
            return Err(EngineError::scrape(
                bad.as_str(),
                "invalid profile name; use letters, digits, '.', '_' or '-'",
            ));
        }

        let mut snapshots = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let snapshot = self.scrape_profile(profile).await;
            write_json(&layout.social_snapshot_file(profile), &snapshot)?;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::scrape(url, format!("HTTP {}", status)));
        }
        Ok(response.text().await?)
    }
}

/// Title and description pulled from a page head
#[derive(Debug, Default, PartialEq)]
struct PageMeta {
    title: Option<String>,
    description: Option<String>,
}

impl PageMeta {
    fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            title: select_text(&document, "title"),
            description: select_attr(&document, "meta[property='og:description']", "content")
                .or_else(|| select_attr(&document, "meta[name='description']", "content")),
        }
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><head>
<title> Asian Paints (@asianpaints) </title>
<meta property="og:description" content="12M Followers, 900 Posts" />
</head><body><p>feed</p></body></html>"#;

    fn scraper_for(base_url: String, sample_chars: usize) -> SocialScraper {
        SocialScraper::new(&ScrapeConfig {
            social_base_url: base_url,
            html_sample_chars: sample_chars,
            timeout_secs: 5,
            ..ScrapeConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_page_meta_parse() {
        let meta = PageMeta::parse(PAGE);
        assert_eq!(meta.title.as_deref(), Some("Asian Paints (@asianpaints)"));
        assert_eq!(meta.description.as_deref(), Some("12M Followers, 900 Posts"));
        assert_eq!(PageMeta::parse("<p>none</p>"), PageMeta::default());
    }

    #[tokio::test]
    async fn test_scrape_profile_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/asianpaints/");
                then.status(200).header("content-type", "text/html").body(PAGE);
            })
            .await;

        let snapshot = scraper_for(server.base_url(), 20).scrape_profile("asianpaints").await;

        mock.assert_async().await;
        assert!(snapshot.is_ok());
        assert_eq!(snapshot.html_sample.chars().count(), 20);
        assert_eq!(snapshot.description.as_deref(), Some("12M Followers, 900 Posts"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_recorded_not_raised() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/bergerpaints/");
                then.status(429);
            })
            .await;

        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let snapshots = scraper_for(server.base_url(), 2000)
            .scrape_all(&["bergerpaints".to_string()], &layout)
            .await
            .unwrap();

        assert!(snapshots[0].status.starts_with("failed:"));
        assert!(snapshots[0].html_sample.is_empty());
        assert!(layout.social_snapshot_file("bergerpaints").exists());
    }

    #[test]
    fn test_profile_names_are_checked() {
        assert!(is_valid_profile("asian.paints_official-1"));
        for bad in ["", "../x", "..", ".hidden", "a/b", "a\\b", "a b", "a?b"] {
            assert!(!is_valid_profile(bad), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_path_like_profile_is_rejected_before_fetch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body(PAGE);
            })
            .await;

        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        let scraper = scraper_for(server.base_url(), 2000);
        let profiles = ["asianpaints".to_string(), "../escaped".to_string()];
        let err = scraper.scrape_all(&profiles, &layout).await.unwrap_err();

        assert!(matches!(err, EngineError::Scrape { ref target, .. } if target == "../escaped"));
        assert_eq!(mock.hits_async().await, 0);
        assert!(!dir.path().join("out/escaped_social.json").exists());
        assert!(!layout.social_snapshot_file("asianpaints").exists());

        let snapshot = scraper.scrape_profile("a/b").await;
        assert!(snapshot.status.starts_with("failed:"));
        assert_eq!(mock.hits_async().await, 0);
    }
}
