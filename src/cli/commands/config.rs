//! Config Command
//!
//! Usage:
//!   calyco config show [-f toml|json|yaml]
//!   calyco config path
//!   calyco config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the merged configuration
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(&std::env::current_dir()?, force)?
    };

    let out = Output::default();
    out.success("Configuration ready");
    out.field("Config", &path.display().to_string());
    Ok(())
}
