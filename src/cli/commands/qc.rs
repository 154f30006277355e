//! QC Command
//!
//! Runs the quality checks on any markdown, text or web copy JSON file.
//!
//! Usage:
//!   calyco qc <file> [--json]

use std::fs;
use std::path::Path;

use crate::cli::{CommandContext, GlobalArgs};
use crate::qc::run_quality_checks;
use crate::types::{Result, WebCopy};

/// Text checked for `path`: the page body for web copy JSON, else the file
pub fn checked_text(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json && let Ok(copy) = serde_json::from_str::<WebCopy>(&content) {
        return Ok(if copy.body.is_empty() {
            copy.render_body()
        } else {
            copy.body
        });
    }
    Ok(content)
}

pub fn run(args: &GlobalArgs, file: &Path, json: bool) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let text = checked_text(file)?;
    let report = run_quality_checks(&text, &ctx.config.brand, &ctx.config.qc);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    ctx.out.header(&format!("Quality checks: {}", file.display()));
    ctx.out
        .field("Readability", &format!("{:.2}", report.readability_score));
    ctx.out.field("Words", &report.word_count.to_string());
    for violation in &report.brand_violations {
        ctx.out.warning(&format!("Banned phrase: {}", violation));
    }
    for issue in &report.seo_issues {
        ctx.out.warning(issue);
    }
    if report.passed {
        ctx.out.success("Passed");
    } else {
        ctx.out.error("Needs review");
    }
    Ok(())
}
