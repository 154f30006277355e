//! SEO Command
//!
//! Writes JSON-LD for every generated page and refreshes `sitemap.xml`.
//!
//! Usage:
//!   calyco seo

use crate::cli::{CommandContext, GlobalArgs};
use crate::seo::{SeoGenerator, discover_pages};
use crate::types::Result;

pub fn run(args: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let pages = discover_pages(&ctx.layout);
    if pages.is_empty() {
        ctx.out.warning("No generated pages found; sitemap keeps existing entries only");
    }

    let mut seo = SeoGenerator::new(ctx.layout.clone(), ctx.config.brand.clone());
    for page in &pages {
        let path = seo.generate_schema(page)?;
        ctx.out.success(&format!("JSON-LD ({}): {}", page.kind, path.display()));
    }

    let sitemap = seo.generate_sitemap()?;
    ctx.out.success(&format!("Sitemap: {}", sitemap.display()));
    Ok(())
}
