//! Model output → content records
//!
//! Models drift from the requested shape: keys get renamed, arrays come back
//! as strings, markdown arrives fenced. These parsers accept the common
//! variants and leave anything unusable to the fallback content.

use chrono::Utc;
use serde_json::Value;

use crate::types::{
    AdSnippet, BlogPost, SocialPost, WebCopy, json_string, json_string_array, slugify,
    truncate_chars,
};

const DESCRIPTION_CHARS: usize = 160;

/// First present key wins
fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| json_string(value, k))
}

/// Build web copy from a model JSON object; `None` when no title is present
pub fn parse_web_copy(value: &Value, topic: &str) -> Option<WebCopy> {
    let title = first_string(value, &["title", "product_name", "headline"])?;
    let seo = value
        .get("seo_meta")
        .or_else(|| value.get("seo"))
        .or_else(|| value.get("meta"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut copy = WebCopy {
        slug: slugify(topic),
        title,
        subtitle: first_string(value, &["subtitle", "tagline"]).unwrap_or_default(),
        description: first_string(value, &["description", "intro"]).unwrap_or_default(),
        features: json_string_array(value, "features"),
        usage: first_string(value, &["usage", "how_to_use"]).unwrap_or_default(),
        why_calyco: first_string(value, &["why_calyco", "why_calcyo", "why_choose"])
            .unwrap_or_default(),
        meta_title: first_string(value, &["meta_title"])
            .or_else(|| json_string(&seo, "title"))
            .or_else(|| json_string(&seo, "meta_title"))
            .unwrap_or_default(),
        meta_description: first_string(value, &["meta_description"])
            .or_else(|| json_string(&seo, "description"))
            .or_else(|| json_string(&seo, "meta_description"))
            .unwrap_or_default(),
        body: String::new(),
        image: None,
        fallback: false,
        generated_at: Utc::now(),
    };
    copy.body = copy.render_body();
    Some(copy)
}

/// Strip a wrapping ```markdown fence if the whole answer is fenced
fn unfence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
            body.trim_end().strip_suffix("```").unwrap_or(body).trim()
        }
        None => trimmed,
    }
}

/// Markdown line with emphasis markers removed
fn plain(line: &str) -> String {
    line.replace(['*', '_'], "").trim().to_string()
}

/// Value after a `Meta description:` style label
fn labelled_value(line: &str, label: &str) -> Option<String> {
    let clean = plain(line);
    if !clean.to_ascii_lowercase().starts_with(label) {
        return None;
    }
    let value = clean.get(label.len()..)?.trim_start_matches(':').trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Title from the first `# ` line
pub fn blog_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `Meta description:` line, else the first body paragraph (≤160 chars)
pub fn blog_description(markdown: &str) -> String {
    if let Some(meta) = markdown
        .lines()
        .find_map(|l| labelled_value(l, "meta description"))
    {
        return truncate_chars(&meta, DESCRIPTION_CHARS).to_string();
    }

    markdown
        .lines()
        .map(str::trim)
        .find(|l| {
            !l.is_empty()
                && !l.starts_with('#')
                && !l.starts_with("```")
                && labelled_value(l, "meta title").is_none()
        })
        .map(|l| truncate_chars(&plain(l), DESCRIPTION_CHARS).to_string())
        .unwrap_or_default()
}

/// Build a blog post from model markdown; `None` when the text is empty
pub fn parse_blog(markdown: &str, topic: &str) -> Option<BlogPost> {
    let body = unfence(markdown);
    if body.is_empty() {
        return None;
    }
    Some(BlogPost {
        slug: slugify(topic),
        title: blog_title(body).unwrap_or_else(|| topic.to_string()),
        description: blog_description(body),
        body: format!("{}\n", body),
        fallback: false,
        generated_at: Utc::now(),
    })
}

fn hashtag(tag: &str) -> String {
    let tag = tag.trim().trim_start_matches('#');
    format!("#{}", tag)
}

/// Social posts from model JSON items; items without a caption are dropped
pub fn parse_social_posts(items: &[Value], limit: usize) -> Vec<SocialPost> {
    items
        .iter()
        .filter_map(|item| {
            let caption = first_string(item, &["caption", "text", "post"])?;
            Some(SocialPost {
                platform: first_string(item, &["platform", "channel"])
                    .unwrap_or_else(|| "Instagram".to_string()),
                caption,
                hashtags: json_string_array(item, "hashtags")
                    .iter()
                    .map(|t| hashtag(t))
                    .filter(|t| t.len() > 1)
                    .collect(),
            })
        })
        .take(limit)
        .collect()
}

/// Ad snippets from model JSON items; items with no copy at all are dropped
pub fn parse_ads(items: &[Value]) -> Vec<AdSnippet> {
    items
        .iter()
        .filter_map(|item| {
            let ad = AdSnippet {
                channel: first_string(item, &["channel", "platform", "type"])
                    .unwrap_or_else(|| "Google".to_string()),
                headline: json_string(item, "headline"),
                description: json_string(item, "description"),
                text: first_string(item, &["text", "primary_text", "message"]),
            };
            ad.display_text().is_some().then_some(ad)
        })
        .collect()
}
