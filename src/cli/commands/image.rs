//! Image Command
//!
//! Usage:
//!   calyco image --prompt "..." --slug hero

use crate::ai::{ImagePipeline, PromptTemplates};
use crate::cli::{CommandContext, GlobalArgs};
use crate::types::{Result, slugify};

pub async fn run(args: &GlobalArgs, prompt: &str, slug: &str, raw: bool) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let images = ImagePipeline::from_config(&ctx.config.image, ctx.layout.images_dir());

    let prompt = if raw {
        prompt.to_string()
    } else {
        PromptTemplates::image(prompt)
    };
    let outcome = images.generate(&prompt, &slugify(slug)).await?;

    let line = format!("{} ({})", outcome.path.display(), outcome.source);
    if outcome.is_fallback() {
        ctx.out.warning(&format!("Image providers unavailable, used {}", line));
    } else {
        ctx.out.success(&format!("Image saved: {}", line));
    }
    Ok(())
}
