//! Dashboard Command
//!
//! Usage:
//!   calyco dashboard

use crate::cli::{CommandContext, GlobalArgs};
use crate::dashboard::build_dashboard;
use crate::types::Result;

pub fn run(args: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let path = build_dashboard(&ctx.layout, &ctx.config.brand.name)?;
    ctx.out.success(&format!("Dashboard ready: {}", path.display()));
    Ok(())
}
