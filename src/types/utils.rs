//! Shared utility functions for value extraction and text handling.
//!
//! ## JSON Extraction Helpers
//!
//! - `json_string` - Extract strings, tolerating non-string scalars
//! - `json_string_array` - Extract string arrays, or split a comma/space list

use serde_json::Value;

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
///
/// Numbers and booleans are stringified; empty strings count as missing.
pub fn json_string(value: &Value, key: &str) -> Option<String> {
    let s = match value.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Extract string array from JSON value by key.
///
/// Models often return `"#a #b"` or `"a, b"` where an array was requested,
/// so a plain string is split on commas and whitespace.
pub fn json_string_array(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Object(_) => json_string(v, "text").or_else(|| json_string(v, "name")),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split([',', ' ', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

/// URL-safe slug, `untitled` when nothing alphanumeric remains
pub fn slugify(text: &str) -> String {
    let slug = slug::slugify(text);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// First `max` characters of `text` (char boundary safe)
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_json_string() {
        let v = json!({"a": " hi ", "b": 3, "c": "", "d": null});
        assert_eq!(json_string(&v, "a").as_deref(), Some("hi"));
        assert_eq!(json_string(&v, "b").as_deref(), Some("3"));
        assert_eq!(json_string(&v, "c"), None);
        assert_eq!(json_string(&v, "d"), None);
        assert_eq!(json_string(&v, "missing"), None);
    }

    #[test]
    fn test_json_string_array_variants() {
        let v = json!({
            "list": ["#paint", " ", "#home"],
            "flat": "#paint, #home #decor",
            "objects": [{"text": "Durable"}, {"name": "Washable"}]
        });
        assert_eq!(json_string_array(&v, "list"), vec!["#paint", "#home"]);
        assert_eq!(
            json_string_array(&v, "flat"),
            vec!["#paint", "#home", "#decor"]
        );
        assert_eq!(json_string_array(&v, "objects"), vec!["Durable", "Washable"]);
        assert!(json_string_array(&v, "missing").is_empty());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify("Trending Home Paint Colors 2025"),
            "trending-home-paint-colors-2025"
        );
        assert_eq!(slugify("  Low-VOC / Eco!  "), "low-voc-eco");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    proptest! {
        #[test]
        fn slug_is_url_safe(input in ".{0,64}") {
            let slug = slugify(&input);
            prop_assert!(!slug.is_empty());
            prop_assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            );
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }
}
