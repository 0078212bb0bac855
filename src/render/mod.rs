//! Diagram Rendering
//!
//! Two interchangeable backends turn a [`Schema`] plus its
//! [`RelationshipSet`] into a diagram:
//!
//! - [`GraphRenderer`]: Graphviz DOT, rasterized by the local `dot` binary
//! - [`PlantUmlRenderer`]: PlantUML class-diagram text, rasterized by a
//!   PlantUML server
//!
//! Source text is a pure function of its inputs and is rebuilt from scratch
//! on every call.

pub mod graph;
pub mod output;
pub mod plantuml;

pub use graph::{GraphRenderer, to_dot};
pub use output::{timestamped_filename, timestamped_path};

pub(crate) use output::write_staged;
pub use plantuml::{PlantUmlRenderer, parse_arrows, to_plantuml};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::config::RenderConfig;
use crate::schema::{RelationshipSet, Schema};
use crate::types::Result;

// =============================================================================
// Backend & Format
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// PlantUML class diagram
    #[default]
    Uml,
    /// Graphviz directed graph
    Graph,
}

impl RenderBackend {
    /// Extension used when the diagram source itself is saved
    pub fn source_extension(&self) -> &'static str {
        match self {
            Self::Uml => "puml",
            Self::Graph => "dot",
        }
    }
}

impl fmt::Display for RenderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uml => write!(f, "uml"),
            Self::Graph => write!(f, "graph"),
        }
    }
}

impl FromStr for RenderBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uml" | "plantuml" => Ok(Self::Uml),
            "graph" | "graphviz" | "dot" => Ok(Self::Graph),
            _ => Err(format!("Invalid backend '{}'. Valid values: uml, graph", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(format!("Invalid image format '{}'. Valid values: png, svg", s)),
        }
    }
}

// =============================================================================
// Artifact
// =============================================================================

/// A rendered image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Diagram source text plus the files written from it, if any were requested
#[derive(Debug, Clone)]
pub struct DiagramArtifact {
    pub backend: RenderBackend,
    pub source: String,
    pub image: Option<RenderedImage>,
    /// Where `source` was saved as `.puml` / `.dot`
    pub source_path: Option<PathBuf>,
}

// =============================================================================
// Renderer Trait
// =============================================================================

#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    fn backend(&self) -> RenderBackend;

    /// Build the textual diagram
    fn to_source(&self, schema: &Schema, relationships: &RelationshipSet) -> String;

    /// Rasterize `source` to `output`. Nothing is written at `output` on failure.
    async fn render_image(&self, source: &str, output: &Path, format: ImageFormat) -> Result<()>;

    /// Build the source and, when `image` is given, rasterize it
    async fn render(
        &self,
        schema: &Schema,
        relationships: &RelationshipSet,
        image: Option<(&Path, ImageFormat)>,
    ) -> Result<DiagramArtifact> {
        let source = self.to_source(schema, relationships);

        let image = match image {
            Some((path, format)) => {
                self.render_image(&source, path, format).await?;
                info!("Diagram saved as {}", path.display());
                Some(RenderedImage {
                    path: path.to_path_buf(),
                    format,
                })
            }
            None => None,
        };

        Ok(DiagramArtifact {
            backend: self.backend(),
            source,
            image,
            source_path: None,
        })
    }
}

/// Build the renderer selected by `config.backend`
pub fn create_renderer(config: &RenderConfig) -> Result<Box<dyn DiagramRenderer>> {
    match config.backend {
        RenderBackend::Uml => Ok(Box::new(PlantUmlRenderer::new(config)?)),
        RenderBackend::Graph => Ok(Box::new(GraphRenderer::new(config))),
    }
}
