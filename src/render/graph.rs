//! Graphviz Renderer
//!
//! One node per collection and one labeled edge per relationship. Edge
//! labels and targets are whitespace-trimmed. Images are produced by piping
//! the DOT text into `dot -T<format> -o <file>`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::output::{persist, staging_file};
use super::{DiagramRenderer, ImageFormat, RenderBackend};
use crate::config::RenderConfig;
use crate::schema::{RelationshipSet, Schema};
use crate::timeout::with_timeout;
use crate::types::{Result, SchemaGenError};

/// Quote and escape a DOT identifier
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Build a `digraph` for the schema.
///
/// Relationships are looked up per schema key, so entries for collections
/// missing from the schema are not drawn.
pub fn to_dot(schema: &Schema, relationships: &RelationshipSet) -> String {
    let mut lines = vec!["digraph schema {".to_string()];

    for (collection, _) in schema.iter() {
        let source = quote(collection);
        lines.push(format!("  {};", source));

        for rel in relationships.get(collection) {
            lines.push(format!(
                "  {} -> {} [label={}];",
                source,
                quote(rel.target.trim()),
                quote(rel.field.trim())
            ));
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

pub struct GraphRenderer {
    dot_binary: PathBuf,
    timeout: Duration,
}

impl GraphRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            dot_binary: PathBuf::from(&config.dot_binary),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn run_dot(&self, source: &str, target: &Path, format: ImageFormat) -> Result<()> {
        let mut child = Command::new(&self.dot_binary)
            .arg(format!("-T{}", format.extension()))
            .arg("-o")
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SchemaGenError::Render(format!(
                    "Failed to spawn {}: {}. Is Graphviz installed?",
                    self.dot_binary.display(),
                    e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // dot may exit before reading everything; the exit status decides
            if let Err(e) = stdin.write_all(source.as_bytes()).await {
                debug!("Writing DOT to stdin failed: {}", e);
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SchemaGenError::Render(format!(
                "{} exited with {}: {}",
                self.dot_binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DiagramRenderer for GraphRenderer {
    fn backend(&self) -> RenderBackend {
        RenderBackend::Graph
    }

    fn to_source(&self, schema: &Schema, relationships: &RelationshipSet) -> String {
        to_dot(schema, relationships)
    }

    async fn render_image(&self, source: &str, output: &Path, format: ImageFormat) -> Result<()> {
        let staged = staging_file(output)?;
        debug!(
            "Running {} -T{} into {}",
            self.dot_binary.display(),
            format,
            staged.path().display()
        );

        with_timeout(
            self.timeout,
            self.run_dot(source, staged.path(), format),
            "graphviz render",
        )
        .await?;

        persist(staged, output)
    }
}
