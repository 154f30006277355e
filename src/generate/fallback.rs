//! Locally templated content used when generation fails

use chrono::Utc;

use crate::config::BrandConfig;
use crate::types::{AdSnippet, BlogPost, MarketSignals, SocialPost, WebCopy, slugify};

const DEFAULT_THEMES: &[&str] = &["fresh colours", "easy-clean walls", "weather-proof exteriors"];

/// Trend keywords, or generic themes when nothing was scraped
fn themes(signals: &MarketSignals) -> Vec<String> {
    if signals.trends.keywords.is_empty() {
        DEFAULT_THEMES.iter().map(|t| t.to_string()).collect()
    } else {
        signals.trends.keywords.clone()
    }
}

pub fn web_copy(brand: &BrandConfig, topic: &str) -> WebCopy {
    let mut copy = WebCopy {
        slug: slugify(topic),
        title: format!("{} {}", brand.name, topic),
        subtitle: "Lasting colour for every room".to_string(),
        description: format!(
            "{} {} deliver a smooth, even finish that stays fresh wash after wash.",
            brand.name, topic
        ),
        features: vec![
            "Smooth, even finish".to_string(),
            "Washable and stain resistant".to_string(),
            "Low odour for quick move-in".to_string(),
        ],
        usage: "Apply one coat of primer followed by two coats, allowing four hours between coats."
            .to_string(),
        why_calyco: format!(
            "{} shades are developed for Indian homes and climates.",
            brand.name
        ),
        meta_title: format!("{} | {}", topic, brand.name),
        meta_description: format!(
            "Discover {} {}: washable, low odour and long lasting.",
            brand.name, topic
        ),
        body: String::new(),
        image: None,
        fallback: true,
        generated_at: Utc::now(),
    };
    copy.body = copy.render_body();
    copy
}

pub fn blog(brand: &BrandConfig, topic: &str, signals: &MarketSignals) -> BlogPost {
    let description = format!(
        "A practical guide to {} from the {} colour team.",
        topic.to_lowercase(),
        brand.name
    );

    let mut body = format!("# {}\n\n{}\n\n", topic, description);
    for theme in themes(signals) {
        body.push_str(&format!(
            "## {}\n\nHomeowners are searching for {} more than ever. Start with a sample patch, \
             look at it in morning and evening light, and pair it with a neutral trim.\n\n",
            title_case(&theme),
            theme
        ));
    }
    for item in &signals.news {
        body.push_str(&format!("## {}\n\n{}\n\n", item.title, item.summary));
    }
    body.push_str(&format!(
        "## Choosing Your Shade\n\nVisit {} to explore the full palette.\n",
        brand.site_url
    ));

    BlogPost {
        slug: slugify(topic),
        title: topic.to_string(),
        description,
        body,
        fallback: true,
        generated_at: Utc::now(),
    }
}

pub fn social_posts(brand: &BrandConfig, count: usize, signals: &MarketSignals) -> Vec<SocialPost> {
    let themes = themes(signals);
    let brand_tag = format!("#{}", brand.name.replace(' ', ""));

    (0..count)
        .map(|i| {
            let theme = &themes[i % themes.len()];
            let platform = if i % 2 == 0 { "Instagram" } else { "LinkedIn" };
            SocialPost {
                platform: platform.to_string(),
                caption: format!(
                    "Thinking about {}? Find your shade with {}.",
                    theme, brand.name
                ),
                hashtags: vec![
                    brand_tag.clone(),
                    "#HomeDecor".to_string(),
                    "#WallPaint".to_string(),
                ],
            }
        })
        .collect()
}

pub fn ads(brand: &BrandConfig) -> Vec<AdSnippet> {
    vec![
        AdSnippet {
            channel: "Google".to_string(),
            headline: Some(format!("{} Wall Paints", brand.name)),
            description: Some("Washable, low odour finishes in hundreds of shades.".to_string()),
            text: None,
        },
        AdSnippet {
            channel: "Facebook".to_string(),
            headline: None,
            description: None,
            text: Some(format!(
                "Give your home a fresh look this season with {}.",
                brand.name
            )),
        },
        AdSnippet {
            channel: "WhatsApp".to_string(),
            headline: None,
            description: None,
            text: Some(format!(
                "New {} shades are here. Reply COLOUR for a free consultation.",
                brand.name
            )),
        },
    ]
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qc::enforce_brand_rules;
    use crate::scrape::demo_trends;

    #[test]
    fn test_fallback_blog_has_sections_per_trend() {
        let signals = MarketSignals {
            trends: demo_trends(),
            ..MarketSignals::default()
        };
        let post = blog(&BrandConfig::default(), "Trending Home Paint Colors 2025", &signals);

        assert!(post.fallback);
        assert!(post.body.contains("## Home Painting Ideas"));
        assert!(post.body.contains("## Choosing Your Shade"));
    }

    #[test]
    fn test_fallback_copy_is_brand_safe() {
        let brand = BrandConfig::default();
        let copy = web_copy(&brand, "Interior Emulsion Paints");
        let posts = social_posts(&brand, 4, &MarketSignals::default());

        assert!(enforce_brand_rules(&copy.body, &brand.banned_phrases).is_empty());
        assert!(
            posts
                .iter()
                .all(|p| enforce_brand_rules(&p.caption, &brand.banned_phrases).is_empty())
        );
        assert_eq!(posts[1].platform, "LinkedIn");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("interior wall paint"), "Interior Wall Paint");
    }
}
