//! Config Command
//!
//! Manage schemagen configuration.
//!
//! Usage:
//!   schemagen config show [-f toml|json]
//!   schemagen config path
//!   schemagen config init [-g] [--force]

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::load_config;
use crate::config::ConfigLoader;
use crate::types::{Result, SchemaGenError};

/// Print the merged effective configuration
pub fn show(config_path: Option<PathBuf>, format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" | "text" => false,
        other => {
            return Err(SchemaGenError::Config(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    };

    let config = load_config(config_path.as_deref())?;
    println!("{}", ConfigLoader::render_config(&config, as_json)?);
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file (project-level unless `global`)
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };

    let scope = if global { "global" } else { "project" };
    Output::new().success(&format!("Initialized {} configuration", scope));
    println!("  Config: {}", path.display());
    Ok(())
}
