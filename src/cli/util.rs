//! CLI Common Utilities
//!
//! Config loading and flag overrides shared by the command handlers.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{Config, ConfigLoader, StoreBackend, StoreConfig};
use crate::pipeline::PipelineOptions;
use crate::render::{ImageFormat, RenderBackend};
use crate::types::{Result, SchemaGenError};

/// Load the config chain, or defaults plus one explicit file
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(|e| SchemaGenError::Config(format!("Failed to start runtime: {}", e)))
}

/// Document store flags
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub backend: Option<StoreBackend>,
    /// Export directory; implies the json backend unless one is given
    pub data: Option<PathBuf>,
    pub project: Option<String>,
}

impl StoreOverrides {
    pub fn apply(&self, config: &mut StoreConfig) {
        if let Some(data) = &self.data {
            config.path = Some(data.clone());
            config.backend = StoreBackend::Json;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(project) = &self.project {
            config.project_id = Some(project.clone());
        }
    }
}

/// Diagram flags
#[derive(Debug, Clone, Default)]
pub struct RenderOverrides {
    pub backend: Option<RenderBackend>,
    pub format: Option<ImageFormat>,
    pub output: Option<PathBuf>,
    pub no_image: bool,
    pub save_source: bool,
}

impl RenderOverrides {
    pub fn apply(&self, options: &mut PipelineOptions) {
        if let Some(backend) = self.backend {
            options.render.backend = backend;
        }
        if let Some(format) = self.format {
            options.render.format = format;
        } else if let Some(ext) = self.output.as_deref().and_then(Path::extension)
            && let Ok(format) = ext.to_string_lossy().parse::<ImageFormat>()
        {
            options.render.format = format;
        }
        if self.no_image {
            options.render.image = false;
        }
        if self.save_source {
            options.render.save_source = true;
        }
        if self.output.is_some() {
            options.output = self.output.clone();
        }
    }
}
