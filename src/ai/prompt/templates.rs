//! Brand content prompt templates
//!
//! Every template carries the same brand rules and, when available, the
//! scraped market signals as context.

use super::PromptBuilder;
use crate::config::BrandConfig;
use crate::types::MarketSignals;

/// Field layout requested for product page copy
const WEB_COPY_SHAPE: &str = concat!(
    r#"{"title": "...", "subtitle": "...", "description": "...", "features": ["..."], "#,
    r#""usage": "...", "why_calyco": "...", "meta_title": "...", "meta_description": "..."}"#,
);

/// Preset prompts for each content type
pub struct PromptTemplates;

impl PromptTemplates {
    fn base(brand: &BrandConfig, task: &str, signals: &MarketSignals) -> PromptBuilder {
        PromptBuilder::new()
            .role(&format!("{} brand copywriter", brand.name), task)
            .context_item("Brand", &brand.name)
            .context_item("Website", &brand.site_url)
            .section("Market signals", &signals.prompt_context())
    }

    fn brand_rules(brand: &BrandConfig) -> Vec<String> {
        let mut rules = vec![
            format!(
                "Write in the {} voice: warm, confident and practical",
                brand.name
            ),
            "Never mention artificial intelligence, language models or how the text was produced"
                .to_string(),
        ];
        if !brand.banned_phrases.is_empty() {
            rules.push(format!(
                "Never use these phrases: {}",
                brand.banned_phrases.join(", ")
            ));
        }
        rules
    }

    /// Product page copy as a single JSON object
    pub fn web_copy(brand: &BrandConfig, topic: &str, signals: &MarketSignals) -> String {
        Self::base(brand, "product page copy", signals)
            .context_item("Product", topic)
            .objectives(&[
                format!("Write web copy for the {} {} product page", brand.name, topic),
                "Lead with a benefit-driven title and subtitle".to_string(),
                "List concrete product features and how to use the product".to_string(),
                format!("Explain why customers should choose {}", brand.name),
                "Provide an SEO meta title (max 60 chars) and meta description (max 160 chars)"
                    .to_string(),
            ])
            .rules(&Self::brand_rules(brand))
            .output(
                "a single JSON object, no markdown",
                WEB_COPY_SHAPE,
            )
            .build()
    }

    /// Long-form markdown article
    pub fn blog(brand: &BrandConfig, topic: &str, words: usize, signals: &MarketSignals) -> String {
        Self::base(brand, "SEO blog articles", signals)
            .context_item("Topic", topic)
            .context_item("Length", &format!("about {} words", words))
            .objectives(&[
                format!("Write an SEO blog article about '{}'", topic),
                "Start with a single H1 (`# `) title line".to_string(),
                "Organize the body into H2 (`## `) sections with practical advice".to_string(),
                "Weave the rising searches into the text where they fit naturally".to_string(),
                "End with a line `Meta title: ...` and a line `Meta description: ...`".to_string(),
            ])
            .rules(&Self::brand_rules(brand))
            .output("markdown", "")
            .build()
    }

    /// Social posts as a JSON array
    pub fn social_posts(brand: &BrandConfig, count: usize, signals: &MarketSignals) -> String {
        Self::base(brand, "social media campaigns", signals)
            .objectives(&[
                format!("Write {} social media posts", count),
                "Mix Instagram and LinkedIn posts".to_string(),
                "Each post has a caption and 3 to 6 hashtags".to_string(),
            ])
            .rules(&Self::brand_rules(brand))
            .output(
                "a JSON array",
                r##"[{"platform": "Instagram", "caption": "...", "hashtags": ["#Calyco", "#HomeDecor"]}]"##,
            )
            .build()
    }

    /// Ad snippets for Google, Facebook and WhatsApp as a JSON array
    pub fn ads(brand: &BrandConfig, per_channel: usize, signals: &MarketSignals) -> String {
        Self::base(brand, "performance advertising", signals)
            .objectives(&[
                format!("Write {} Google Ads entries with a headline (max 30 chars) and a description (max 90 chars)", per_channel),
                format!("Write {} Facebook Ads primary texts", per_channel),
                format!("Write {} short WhatsApp messages", per_channel),
            ])
            .rules(&Self::brand_rules(brand))
            .output(
                "a JSON array where each item has channel, headline, description and text (omit fields that do not apply)",
                r#"[{"channel": "Google", "headline": "...", "description": "..."}, {"channel": "WhatsApp", "text": "..."}]"#,
            )
            .build()
    }

    /// Hero image prompt for a page
    pub fn image(subject: &str) -> String {
        format!(
            "{}, colorful modern Indian interior with freshly painted walls, realistic, soft natural lighting, high detail",
            subject.trim()
        )
    }
}
