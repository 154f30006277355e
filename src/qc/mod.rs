//! Quality Control
//!
//! Lightweight checks run on generated copy before it is published:
//! - Readability (Flesch Reading Ease)
//! - Brand safety (banned phrases)
//! - SEO structure (headings, length)

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{BrandConfig, QcConfig};
use crate::constants::qc as qc_constants;
use crate::types::QcReport;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").expect("heading pattern is valid"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));
static VOWEL_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[aeiouy]+").expect("vowel pattern is valid"));

/// Words containing at least one letter or digit
fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Vowel-group syllable estimate, at least one per word
fn syllables(word: &str) -> usize {
    let lower: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if lower.is_empty() {
        return 1;
    }

    let mut count = VOWEL_GROUP.find_iter(&lower).count();
    // silent trailing e: "paint-able" counts, "shade" does not
    if count > 1 && lower.ends_with('e') && !lower.ends_with("le") {
        count -= 1;
    }
    count.max(1)
}

/// Flesch Reading Ease, rounded to two decimals; 60.0 when there are no words
///
/// `206.835 − 1.015 × (words / sentences) − 84.6 × (syllables / words)`
pub fn check_readability(text: &str) -> f64 {
    let words = words(text);
    if words.is_empty() {
        return qc_constants::FALLBACK_READABILITY;
    }

    let sentences = SENTENCE_END.find_iter(text).count().max(1) as f64;
    let word_count = words.len() as f64;
    let syllable_count = words.iter().map(|w| syllables(w)).sum::<usize>() as f64;

    let score = 206.835 - 1.015 * (word_count / sentences) - 84.6 * (syllable_count / word_count);
    (score * 100.0).round() / 100.0
}

/// Banned phrases found in `text`, in list order
///
/// Matching is case-insensitive on whole words, so "llm" does not fire
/// inside "fullmoon".
pub fn enforce_brand_rules(text: &str, banned: &[String]) -> Vec<String> {
    banned
        .iter()
        .filter(|phrase| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase.trim()));
            Regex::new(&pattern)
                .map(|re| re.is_match(text))
                .unwrap_or_else(|_| text.to_lowercase().contains(&phrase.to_lowercase()))
        })
        .cloned()
        .collect()
}

/// Markdown heading count
pub fn count_headings(text: &str) -> usize {
    HEADING.find_iter(text).count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn check_seo_structure(text: &str, rules: &QcConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if count_headings(text) < rules.min_headings {
        issues.push("Content missing headings (H2/H3).".to_string());
    }

    if word_count(text) < rules.min_words {
        issues.push(format!("Content too short (<{} words).", rules.min_words));
    }

    issues
}

pub fn run_quality_checks(text: &str, brand: &BrandConfig, rules: &QcConfig) -> QcReport {
    let brand_violations = enforce_brand_rules(text, &brand.banned_phrases);
    let seo_issues = check_seo_structure(text, rules);
    let passed = brand_violations.is_empty() && seo_issues.is_empty();

    QcReport {
        readability_score: check_readability(text),
        brand_violations,
        seo_issues,
        word_count: word_count(text),
        passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn banned() -> Vec<String> {
        BrandConfig::default().banned_phrases
    }

    #[test]
    fn test_readability_known_text() {
        // 5 words, 1 sentence, 5 syllables
        let score = check_readability("The cat sat on mats.");
        let expected = 206.835 - 1.015 * 5.0 - 84.6 * 1.0;
        assert!((score - (expected * 100.0_f64).round() / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_readability_empty_text() {
        assert_eq!(check_readability(""), 60.0);
        assert_eq!(check_readability("  ... !!"), 60.0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(syllables("paint"), 1);
        assert_eq!(syllables("shade"), 1);
        assert_eq!(syllables("colour"), 2);
        assert_eq!(syllables("durable"), 3);
        assert_eq!(syllables("2025"), 1);
    }

    #[test]
    fn test_brand_rules_in_list_order() {
        let text = "Written by ChatGPT, not AI-Generated at all. LLM inside.";
        assert_eq!(
            enforce_brand_rules(text, &banned()),
            vec!["ai-generated", "chatgpt", "llm"]
        );
    }

    #[test]
    fn test_brand_rules_whole_words_only() {
        assert!(enforce_brand_rules("A fullmoon shade of grey", &banned()).is_empty());
    }

    #[test]
    fn test_seo_structure_messages() {
        let rules = QcConfig::default();
        let issues = check_seo_structure("Short text with # one hash", &rules);
        assert_eq!(
            issues,
            vec![
                "Content missing headings (H2/H3).",
                "Content too short (<300 words)."
            ]
        );
    }

    #[test]
    fn test_run_quality_checks_passes_good_copy() {
        let body = format!(
            "# Colours of 2025\n\n## Warm neutrals\n\n{}\n\n## Accent walls\n\nTry terracotta.\n",
            "Soft beige walls make small rooms feel larger. ".repeat(40)
        );
        let report = run_quality_checks(&body, &BrandConfig::default(), &QcConfig::default());

        assert!(report.passed, "{report:?}");
        assert!(report.word_count >= 300);
        assert!(report.readability_score > 0.0);
    }

    proptest! {
        #[test]
        fn prop_readability_is_finite(text in "\\PC{0,400}") {
            let score = check_readability(&text);
            prop_assert!(score.is_finite());
        }

        #[test]
        fn prop_passed_iff_no_findings(words in 0usize..400) {
            let text = "paint ".repeat(words);
            let report = run_quality_checks(&text, &BrandConfig::default(), &QcConfig::default());
            let clean = report.brand_violations.is_empty() && report.seo_issues.is_empty();
            prop_assert_eq!(report.passed, clean);
            prop_assert!(!report.passed);
        }
    }
}
