//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config ($XDG_CONFIG_HOME/schemagen/config.toml)
//! 3. Project config (.schemagen/config.toml)
//! 4. Environment variables (SCHEMAGEN_* prefix)
//!
//! CLI flags are applied on top by the command layer.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, SchemaGenError};

const ENV_PREFIX: &str = "SCHEMAGEN_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::extract(figment.merge(Self::env_provider()))
    }

    /// Load defaults merged with one explicit file, then env vars
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(SchemaGenError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Self::env_provider());
        Self::extract(figment)
    }

    /// `SCHEMAGEN_<SECTION>_<KEY>`: the first underscore after the prefix
    /// separates section from key, so `SCHEMAGEN_LLM_TIMEOUT_SECS` sets
    /// `llm.timeout_secs`.
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().replacen('_', ".", 1).into())
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| SchemaGenError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/schemagen/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("schemagen"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".schemagen")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

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

    /// Render the effective configuration as JSON or TOML
    pub fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| SchemaGenError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default config to the global directory
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            SchemaGenError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, force)
    }

    /// Write the default config to `.schemagen/` in the current directory
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default(&Self::project_dir(), force)
    }

    fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            let body = toml::to_string_pretty(&Config::default())
                .map_err(|e| SchemaGenError::Config(e.to_string()))?;
            fs::write(&config_path, format!("{}{}", Self::header(), body))?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    fn header() -> &'static str {
        "# schemagen configuration\n\
         # Secrets are read from OPENAI_API_KEY and GOOGLE_OAUTH_ACCESS_TOKEN,\n\
         # or set llm.api_key / store.access_token here.\n\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use crate::render::RenderBackend;
    use figment::Jail;

    fn isolate(jail: &mut Jail) {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());
    }

    #[test]
    fn test_load_default_config() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.llm.provider, "openai");
            assert_eq!(config.sampling.limit, 50);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir(".schemagen")?;
            jail.create_file(
                ".schemagen/config.toml",
                "[store]\nbackend = \"json\"\npath = \"export\"\n\n[sampling]\nlimit = 10\n",
            )?;

            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.store.backend, StoreBackend::Json);
            assert_eq!(config.store.path, Some(PathBuf::from("export")));
            assert_eq!(config.sampling.limit, 10);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir(".schemagen")?;
            jail.create_file(".schemagen/config.toml", "[llm]\nmodel = \"from-file\"\n")?;
            jail.set_env("SCHEMAGEN_LLM_MODEL", "from-env");
            jail.set_env("SCHEMAGEN_LLM_TIMEOUT_SECS", "42");
            jail.set_env("SCHEMAGEN_RENDER_BACKEND", "graph");

            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.llm.model.as_deref(), Some("from-env"));
            assert_eq!(config.llm.timeout_secs, 42);
            assert_eq!(config.render.backend, RenderBackend::Graph);
            Ok(())
        });
    }

    #[test]
    fn test_global_config() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir("xdg/schemagen")?;
            jail.create_file("xdg/schemagen/config.toml", "[llm]\nprovider = \"ollama\"\n")?;

            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.llm.provider, "ollama");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("SCHEMAGEN_SAMPLING_LIMIT", "0");
            assert!(matches!(
                ConfigLoader::load(),
                Err(SchemaGenError::Config(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_init_project_writes_loadable_defaults() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let path = ConfigLoader::init_project(false).unwrap();
            assert_eq!(path, PathBuf::from(".schemagen/config.toml"));

            let config = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(config.render.prefix, "schema");
            Ok(())
        });
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir(".schemagen")?;
            jail.create_file(".schemagen/config.toml", "[sampling]\nlimit = 7\n")?;

            ConfigLoader::init_project(false).unwrap();
            assert_eq!(ConfigLoader::load().unwrap().sampling.limit, 7);

            ConfigLoader::init_project(true).unwrap();
            assert_eq!(ConfigLoader::load().unwrap().sampling.limit, 50);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(ConfigLoader::load_from_file(Path::new("/nonexistent/schemagen.toml")).is_err());
    }
}
