//! Clean Command
//!
//! Removes generated artifacts. Scraped `raw/` data is kept unless `--all`
//! is given, in which case the whole output directory goes.
//!
//! Usage:
//!   calyco clean [--all]

use std::path::PathBuf;

use crate::cli::{CommandContext, GlobalArgs};
use crate::pipeline::OutputLayout;
use crate::types::Result;

/// Paths removed by `clean`, existing ones only
pub fn targets(layout: &OutputLayout, all: bool) -> Vec<PathBuf> {
    let candidates = if all {
        vec![layout.root().to_path_buf()]
    } else {
        vec![
            layout.web_copy_dir(),
            layout.blogs_dir(),
            layout.social_dir(),
            layout.ads_dir(),
            layout.images_dir(),
            layout.qc_dir(),
            layout.sitemap_file(),
            layout.dashboard_file(),
            layout.run_report_file(),
        ]
    };

    candidates.into_iter().filter(|p| p.exists()).collect()
}

pub async fn run(args: &GlobalArgs, all: bool) -> Result<()> {
    let ctx = CommandContext::load(args)?;
    let targets = targets(&ctx.layout, all);

    if targets.is_empty() {
        ctx.out.info("Nothing to clean");
        return Ok(());
    }

    for path in targets {
        if path.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        ctx.out.success(&format!("Removed {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_targets_keep_raw_unless_all() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("outputs"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.sitemap_file(), "<urlset/>").unwrap();

        let partial = targets(&layout, false);
        assert!(partial.contains(&layout.sitemap_file()));
        assert!(partial.contains(&layout.images_dir()));
        assert!(!partial.contains(&layout.raw_dir()));

        assert_eq!(targets(&layout, true), vec![layout.root().to_path_buf()]);
    }
}
