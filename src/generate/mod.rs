//! Content Generation
//!
//! Turns prompts into web copy, a blog article, social posts and ad snippets.
//! A provider failure or unusable output never aborts generation: the
//! generator logs a warning and writes locally templated content flagged with
//! `fallback: true` (web copy, blog) or a short default list (social, ads).

mod fallback;
mod parse;

pub use parse::{
    blog_description, blog_title, parse_ads, parse_blog, parse_social_posts, parse_web_copy,
};

use tracing::{info, warn};

use crate::ai::{PromptTemplates, SharedProvider, extract_json_array, extract_json_from_response};
use crate::config::{BrandConfig, ContentConfig};
use crate::pipeline::{OutputLayout, write_json};
use crate::types::{AdSnippet, BlogPost, MarketSignals, Result, SocialPost, WebCopy};

pub struct ContentGenerator {
    provider: SharedProvider,
    brand: BrandConfig,
    content: ContentConfig,
    layout: OutputLayout,
}

impl ContentGenerator {
    pub fn new(
        provider: SharedProvider,
        brand: BrandConfig,
        content: ContentConfig,
        layout: OutputLayout,
    ) -> Self {
        Self {
            provider,
            brand,
            content,
            layout,
        }
    }

    /// Model text for `prompt`, or `None` after logging the failure
    async fn ask(&self, what: &str, prompt: &str) -> Option<String> {
        match self.provider.generate(prompt).await {
            Ok(response) => {
                info!(
                    what,
                    provider = %response.metadata.provider,
                    tokens = response.usage.total(),
                    "Content generated"
                );
                Some(response.content)
            }
            Err(e) => {
                warn!(what, error = %e, "Generation failed, using fallback");
                None
            }
        }
    }

    /// Generate and write `web_copy/<slug>.json`
    pub async fn web_copy(&self, signals: &MarketSignals) -> Result<WebCopy> {
        let topic = &self.content.web_copy_topic;
        let prompt = PromptTemplates::web_copy(&self.brand, topic, signals);

        let parsed = match self.ask("web copy", &prompt).await {
            Some(text) => match extract_json_from_response(&text) {
                Ok(value) => parse_web_copy(&value, topic),
                Err(e) => {
                    warn!(error = %e, "Web copy was not valid JSON, using fallback");
                    None
                }
            },
            None => None,
        };

        let copy = parsed.unwrap_or_else(|| fallback::web_copy(&self.brand, topic));
        self.save_web_copy(&copy)?;
        Ok(copy)
    }

    pub fn save_web_copy(&self, copy: &WebCopy) -> Result<()> {
        let path = self.layout.web_copy_file(&copy.slug);
        write_json(&path, copy)?;
        info!(path = %path.display(), fallback = copy.fallback, "Web copy saved");
        Ok(())
    }

    /// Generate and write `blogs/<slug>.md`
    pub async fn blog(&self, signals: &MarketSignals) -> Result<BlogPost> {
        let topic = &self.content.blog_topic;
        let prompt = PromptTemplates::blog(&self.brand, topic, self.content.blog_words, signals);

        let post = self
            .ask("blog", &prompt)
            .await
            .and_then(|text| parse_blog(&text, topic))
            .unwrap_or_else(|| fallback::blog(&self.brand, topic, signals));

        let path = self.layout.blog_file(&post.slug);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &post.body)?;
        info!(path = %path.display(), fallback = post.fallback, "Blog saved");
        Ok(post)
    }

    /// Generate and write `social/social_posts.json`
    pub async fn social_posts(&self, signals: &MarketSignals) -> Result<Vec<SocialPost>> {
        let count = self.content.social_post_count;
        let prompt = PromptTemplates::social_posts(&self.brand, count, signals);

        let mut posts = match self.ask("social posts", &prompt).await {
            Some(text) => match extract_json_array(&text) {
                Ok(items) => parse_social_posts(&items, count),
                Err(e) => {
                    warn!(error = %e, "Social posts were not a JSON array");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        if posts.is_empty() {
            posts = fallback::social_posts(&self.brand, count, signals);
        }

        let path = self.layout.social_posts_file();
        write_json(&path, &posts)?;
        info!(posts = posts.len(), path = %path.display(), "Social posts saved");
        Ok(posts)
    }

    /// Generate and write `ads/ad_snippets.json`
    pub async fn ads(&self, signals: &MarketSignals) -> Result<Vec<AdSnippet>> {
        let prompt = PromptTemplates::ads(&self.brand, self.content.ads_per_channel, signals);

        let mut ads = match self.ask("ads", &prompt).await {
            Some(text) => match extract_json_array(&text) {
                Ok(items) => parse_ads(&items),
                Err(e) => {
                    warn!(error = %e, "Ads were not a JSON array");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        if ads.is_empty() {
            ads = fallback::ads(&self.brand);
        }

        let path = self.layout.ads_file();
        write_json(&path, &ads)?;
        info!(ads = ads.len(), path = %path.display(), "Ad snippets saved");
        Ok(ads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmProvider, LlmResponse};
    use crate::types::EngineError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Answers by prompt content; `None` fails every call
    struct ScriptedProvider {
        answers: Option<Vec<(&'static str, &'static str)>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
            let answers = self
                .answers
                .as_ref()
                .ok_or_else(|| EngineError::LlmApi("service unavailable".into()))?;
            answers
                .iter()
                .find(|(needle, _)| prompt.contains(needle))
                .map(|(_, answer)| LlmResponse::content_only(*answer))
                .ok_or_else(|| EngineError::LlmApi("no scripted answer".into()))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn generator(
        dir: &TempDir,
        answers: Option<Vec<(&'static str, &'static str)>>,
    ) -> ContentGenerator {
        ContentGenerator::new(
            Arc::new(ScriptedProvider { answers }),
            BrandConfig::default(),
            ContentConfig {
                social_post_count: 3,
                ads_per_channel: 2,
                ..ContentConfig::default()
            },
            OutputLayout::new(dir.path()),
        )
    }

    #[tokio::test]
    async fn test_web_copy_from_model_json() {
        let dir = TempDir::new().unwrap();
        let generator = generator(
            &dir,
            Some(vec![(
                "product page",
                "```json\n{\"title\": \"Calyco Velvet Touch\", \"features\": [\"Washable\"]}\n```",
            )]),
        );

        let copy = generator.web_copy(&MarketSignals::default()).await.unwrap();

        assert_eq!(copy.title, "Calyco Velvet Touch");
        assert!(!copy.fallback);
        assert!(dir.path().join("web_copy/interior-emulsion-paints.json").exists());
    }

    #[tokio::test]
    async fn test_failures_produce_flagged_fallbacks() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, None);
        let signals = MarketSignals::default();

        let copy = generator.web_copy(&signals).await.unwrap();
        let blog = generator.blog(&signals).await.unwrap();
        let posts = generator.social_posts(&signals).await.unwrap();
        let ads = generator.ads(&signals).await.unwrap();

        assert!(copy.fallback);
        assert!(blog.fallback);
        assert!(blog.body.starts_with("# "));
        assert_eq!(posts.len(), 3);
        assert!(!ads.is_empty());
        assert!(dir.path().join("blogs/trending-home-paint-colors-2025.md").exists());
        assert!(dir.path().join("ads/ad_snippets.json").exists());
    }

    #[tokio::test]
    async fn test_unparsable_social_output_falls_back() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, Some(vec![("social media", "Sorry, no JSON today.")]));

        let posts = generator.social_posts(&MarketSignals::default()).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.hashtags.contains(&"#Calyco".to_string())));
    }

    #[tokio::test]
    async fn test_blog_markdown_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let generator = generator(
            &dir,
            Some(vec![(
                "SEO blog",
                "# Colours of 2025\n\nWarm neutrals lead.\n\n## Terracotta\n\nEarthy.\n",
            )]),
        );

        let post = generator.blog(&MarketSignals::default()).await.unwrap();
        let written =
            std::fs::read_to_string(dir.path().join("blogs/trending-home-paint-colors-2025.md"))
                .unwrap();

        assert_eq!(post.title, "Colours of 2025");
        assert_eq!(post.description, "Warm neutrals lead.");
        assert_eq!(written, post.body);
    }
}
