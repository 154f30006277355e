//! Export Command
//!
//! Usage:
//!   calyco export [--start YYYY-MM-DD]

use chrono::{NaiveDate, Utc};

use crate::cli::{CommandContext, GlobalArgs};
use crate::export::export_social_schedule;
use crate::pipeline::read_json_opt;
use crate::types::{EngineError, Result, SocialPost};

pub fn run(args: &GlobalArgs, start: Option<NaiveDate>) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let source = ctx.layout.social_posts_file();

    let posts: Vec<SocialPost> = read_json_opt(&source)?.ok_or_else(|| {
        EngineError::pipeline(
            "export",
            format!(
                "{} not found; run `calyco generate social` first",
                source.display()
            ),
        )
    })?;

    let start = start.unwrap_or_else(|| Utc::now().date_naive());
    let path = ctx.layout.schedule_file();
    let rows = export_social_schedule(&posts, start, &path)?;

    ctx.out.success(&format!("Scheduled {} posts from {}: {}", rows, start, path.display()));
    Ok(())
}
