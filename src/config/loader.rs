//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/calyco/config.toml)
//! 3. Project config (./calyco.toml)
//! 4. Environment variables (CALYCO_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{EngineError, Result};

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "calyco.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CALYCO_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let global = Self::global_config_path();
        Self::load_layers(global.as_deref(), &Self::project_config_path(), true)
    }

    /// Load from explicit files; missing files are skipped
    pub fn load_layers(global: Option<&Path>, project: &Path, with_env: bool) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // e.g. CALYCO_LLM__MODEL -> llm.model
        if with_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));
        }

        let config: Config = figment
            .extract()
            .map_err(|e| EngineError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (platform specific, e.g. ~/.config/calyco/)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "calyco", "calyco").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Print config file locations and whether they exist
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration as toml, json or yaml
    pub fn render(config: &Config, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(config)?),
            "yaml" => serde_yaml::to_string(config).map_err(|e| EngineError::Config(e.to_string())),
            _ => toml::to_string_pretty(config).map_err(|e| EngineError::Config(e.to_string())),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default global config; returns its path
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            EngineError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir.join("config.toml"), force)
    }

    /// Write the default project config into `dir`; returns its path
    pub fn init_project(dir: &Path, force: bool) -> Result<PathBuf> {
        Self::write_default(&dir.join(PROJECT_CONFIG_FILE), force)
    }

    fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(path.to_path_buf());
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let body = Self::render(&Config::default(), "toml")?;
        fs::write(
            path,
            format!(
                "# Calyco content engine configuration\n# API keys are read from GEMINI_API_KEY, OPENAI_API_KEY and HF_API_KEY.\n\n{}",
                body
            ),
        )?;
        info!("Created config: {}", path.display());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_layers(None, &dir.path().join("missing.toml"), false).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.brand.name, "Calyco");
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("calyco.toml");
        fs::write(&global, "[llm]\ntemperature = 0.2\nmax_retries = 5\n").unwrap();
        fs::write(&project, "[llm]\ntemperature = 0.9\n").unwrap();

        let config = ConfigLoader::load_layers(Some(&global), &project, false).unwrap();
        assert_eq!(config.llm.temperature, 0.9);
        assert_eq!(config.llm.max_retries, 5);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("calyco.toml");
        fs::write(&project, "[llm]\ntemperature = 9.0\n").unwrap();

        let err = ConfigLoader::load_layers(None, &project, false).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_init_project_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = ConfigLoader::init_project(dir.path(), false).unwrap();
        assert!(path.exists());

        let config = ConfigLoader::load_layers(None, &path, false).unwrap();
        assert_eq!(config.content.blog_topic, "Trending Home Paint Colors 2025");

        // Existing file is left alone without --force
        fs::write(&path, "[brand]\nname = \"Edited\"\n").unwrap();
        ConfigLoader::init_project(dir.path(), false).unwrap();
        let config = ConfigLoader::load_layers(None, &path, false).unwrap();
        assert_eq!(config.brand.name, "Edited");
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        assert!(ConfigLoader::render(&config, "json").unwrap().contains("\"brand\""));
        assert!(ConfigLoader::render(&config, "yaml").unwrap().contains("brand:"));
        assert!(ConfigLoader::render(&config, "toml").unwrap().contains("[brand]"));
    }
}
