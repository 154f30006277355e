//! Shared setup for CLI commands

use std::path::PathBuf;

use super::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::pipeline::OutputLayout;
use crate::types::Result;

/// Flags every subcommand accepts
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Overrides `output.dir`
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

/// Resolved configuration, output tree and console
pub struct CommandContext {
    pub config: Config,
    pub layout: OutputLayout,
    pub out: Output,
}

impl CommandContext {
    /// Load configuration and apply CLI overrides
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Ok(Self::from_config(config, args))
    }

    pub fn from_config(mut config: Config, args: &GlobalArgs) -> Self {
        if let Some(dir) = &args.output {
            config.output.dir = dir.clone();
        }
        let layout = OutputLayout::new(&config.output.dir);
        Self {
            config,
            layout,
            out: Output::new(args.quiet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_override() {
        let args = GlobalArgs {
            output: Some(PathBuf::from("/tmp/elsewhere")),
            quiet: true,
        };
        let ctx = CommandContext::from_config(Config::default(), &args);

        assert_eq!(ctx.config.output.dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(ctx.layout.root(), std::path::Path::new("/tmp/elsewhere"));
    }
}
