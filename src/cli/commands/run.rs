//! Run Command
//!
//! Executes the whole pipeline and prints the step summary.
//!
//! Usage:
//!   calyco run [--output DIR]

use std::sync::Arc;

use crate::ai::ImagePipeline;
use crate::cli::{CommandContext, GlobalArgs};
use crate::pipeline::{Pipeline, text_provider};
use crate::types::Result;

/// Providers in fallback order, or what happens when there are none
fn chain_label<S: AsRef<str>>(names: &[S], when_empty: &str) -> String {
    if names.is_empty() {
        return when_empty.to_string();
    }
    names.iter().map(|n| n.as_ref()).collect::<Vec<&str>>().join(" → ")
}

pub async fn run(args: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let out = &ctx.out;

    out.header(&format!("{} content engine", ctx.config.brand.name));
    out.field("Output", &ctx.layout.root().display().to_string());

    let text = text_provider(&ctx.config.llm);
    let images = ImagePipeline::from_config(&ctx.config.image, ctx.layout.images_dir());
    out.field("Text", &chain_label(&text.provider_names(), "none (fallback copy)"));
    out.field(
        "Images",
        &chain_label(&images.provider_names(), "none (stock or placeholder)"),
    );

    let pipeline = Pipeline::new(ctx.config.clone(), Arc::new(text), images);
    let report = pipeline.run().await?;

    out.run_report(&report);
    out.field("Report", &ctx.layout.run_report_file().display().to_string());
    out.field("Dashboard", &ctx.layout.dashboard_file().display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_label() {
        assert_eq!(chain_label(&["gemini", "openai"], "none"), "gemini → openai");
        assert_eq!(chain_label::<String>(&[], "none (fallback copy)"), "none (fallback copy)");
    }
}
