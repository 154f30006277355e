//! sitemap.xml rendering and merging

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static URL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<url>(.*?)</url>").expect("url pattern is valid"));
static LOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<loc>\s*(.*?)\s*</loc>").expect("loc pattern is valid"));
static LASTMOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<lastmod>\s*(.*?)\s*</lastmod>").expect("lastmod pattern is valid")
});
static CHANGEFREQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<changefreq>\s*(.*?)\s*</changefreq>").expect("changefreq pattern is valid")
});
static PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<priority>\s*(.*?)\s*</priority>").expect("priority pattern is valid")
});

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// See <https://www.sitemaps.org/protocol.html#changefreqdef>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }

    /// Case-insensitive; `None` for values outside the protocol
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" => Some(ChangeFreq::Always),
            "hourly" => Some(ChangeFreq::Hourly),
            "daily" => Some(ChangeFreq::Daily),
            "weekly" => Some(ChangeFreq::Weekly),
            "monthly" => Some(ChangeFreq::Monthly),
            "yearly" => Some(ChangeFreq::Yearly),
            "never" => Some(ChangeFreq::Never),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<ChangeFreq>,
    pub priority: Option<f32>,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&self.loc)));

        if let Some(ref lastmod) = self.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(lastmod)));
        }

        if let Some(changefreq) = self.changefreq {
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                changefreq.as_str()
            ));
        }

        if let Some(priority) = self.priority {
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", priority));
        }

        xml.push_str("  </url>\n");
        xml
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Entries found in an existing sitemap document
///
/// Tolerates a truncated file: any complete `<url>` block is kept, the rest
/// is ignored.
pub fn parse_entries(xml: &str) -> Vec<SitemapEntry> {
    URL_BLOCK
        .captures_iter(xml)
        .filter_map(|block| {
            let inner = block.get(1)?.as_str();
            let loc = LOC.captures(inner)?.get(1)?.as_str();
            if loc.is_empty() {
                return None;
            }
            let field = |re: &Regex| {
                re.captures(inner)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str())
            };
            Some(SitemapEntry {
                loc: unescape_xml(loc),
                lastmod: field(&LASTMOD).map(unescape_xml),
                changefreq: field(&CHANGEFREQ).and_then(ChangeFreq::parse),
                priority: field(&PRIORITY)
                    .and_then(|p| p.parse::<f32>().ok())
                    .filter(|p| (0.0..=1.0).contains(p)),
            })
        })
        .collect()
}

/// Merge `existing` and `fresh`, one entry per location, sorted by location
///
/// A fresh entry replaces an existing one at the same location.
pub fn merge_entries(existing: Vec<SitemapEntry>, fresh: &[SitemapEntry]) -> Vec<SitemapEntry> {
    let mut by_loc: BTreeMap<String, SitemapEntry> = BTreeMap::new();
    for entry in existing {
        by_loc.entry(entry.loc.clone()).or_insert(entry);
    }
    for entry in fresh {
        by_loc.insert(entry.loc.clone(), entry.clone());
    }
    by_loc.into_values().collect()
}

/// Complete `<urlset>` document
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NS));
    for entry in entries {
        xml.push_str(&entry.to_xml());
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(loc: &str, lastmod: &str) -> SitemapEntry {
        SitemapEntry {
            loc: loc.to_string(),
            lastmod: Some(lastmod.to_string()),
            changefreq: Some(ChangeFreq::Weekly),
            priority: Some(0.8),
        }
    }

    #[test]
    fn test_render_is_closed_and_escaped() {
        let xml = render(&[weekly("https://calycopaints.com/a?b=1&c=2", "2025-01-01")]);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert!(xml.contains("<loc>https://calycopaints.com/a?b=1&amp;c=2</loc>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn test_parse_entries_tolerates_unclosed_file() {
        let legacy = "<?xml version=\"1.0\"?>\n<urlset>\n  <url>\n    <loc>https://x.com/blog/a</loc>\n    <lastmod>2024-05-01</lastmod>\n  </url>\n  <url>\n    <loc>https://x.com/b</loc>\n";
        let entries = parse_entries(legacy);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://x.com/blog/a");
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_parse_entries_keeps_changefreq_and_priority() {
        let xml = render(&[
            weekly("https://x.com/a", "2025-01-01"),
            SitemapEntry {
                changefreq: Some(ChangeFreq::Monthly),
                priority: Some(0.5),
                ..SitemapEntry::new("https://x.com/b")
            },
        ]);
        let entries = parse_entries(&xml);

        assert_eq!(entries[0], weekly("https://x.com/a", "2025-01-01"));
        assert_eq!(entries[1].changefreq, Some(ChangeFreq::Monthly));
        assert_eq!(entries[1].priority, Some(0.5));
    }

    #[test]
    fn test_parse_entries_drops_invalid_fields() {
        let xml = "<urlset><url><loc>https://x.com/a</loc><changefreq>sometimes</changefreq><priority>7</priority></url></urlset>";
        let entries = parse_entries(xml);

        assert_eq!(entries[0].changefreq, None);
        assert_eq!(entries[0].priority, None);
        assert_eq!(ChangeFreq::parse(" Weekly "), Some(ChangeFreq::Weekly));
    }

    #[test]
    fn test_merge_dedupes_and_prefers_fresh() {
        let existing = vec![
            SitemapEntry::new("https://x.com/b"),
            SitemapEntry::new("https://x.com/a"),
            SitemapEntry::new("https://x.com/a"),
        ];
        let merged = merge_entries(existing, &[weekly("https://x.com/a", "2025-02-02")]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], weekly("https://x.com/a", "2025-02-02"));
        assert_eq!(merged[1].loc, "https://x.com/b");
    }

    #[test]
    fn test_round_trip_keeps_locations() {
        let xml = render(&[weekly("https://x.com/a&b", "2025-01-01")]);
        assert_eq!(parse_entries(&xml)[0].loc, "https://x.com/a&b");
    }
}
