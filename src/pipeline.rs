//! Schema Pipeline
//!
//! Sample → infer → render, strictly in sequence. The intermediate schema
//! and relationships are printed as JSON and never persisted.

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::ai::{SharedProvider, TokenUsage};
use crate::config::{Config, RenderConfig};
use crate::inference::RelationshipInferrer;
use crate::render::{DiagramArtifact, create_renderer, timestamped_path, write_staged};
use crate::schema::{RelationshipSet, Schema, SchemaSampler};
use crate::store::SharedStore;
use crate::types::Result;

/// Per-run settings resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub sample_limit: usize,
    pub relationship_max_tokens: usize,
    pub format_max_tokens: usize,
    pub render: RenderConfig,
    /// Explicit image path; overrides the timestamped name
    pub output: Option<PathBuf>,
    /// Print stage banners and intermediate JSON to stdout
    pub echo: bool,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            sample_limit: config.sampling.limit,
            relationship_max_tokens: config.inference.relationship_max_tokens,
            format_max_tokens: config.inference.format_max_tokens,
            render: config.render.clone(),
            output: None,
            echo: true,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl PipelineOptions {
    /// Where the image goes, or `None` when no image was requested
    pub fn image_target(&self) -> Option<PathBuf> {
        if !self.render.image {
            return None;
        }
        Some(self.output.clone().unwrap_or_else(|| {
            timestamped_path(
                &self.render.output_dir,
                &self.render.prefix,
                self.render.format.extension(),
            )
        }))
    }

    /// Where the diagram text goes, or `None` unless `render.save_source` is set.
    ///
    /// Sits beside an explicit image path, otherwise gets its own timestamped name.
    pub fn source_target(&self) -> Option<PathBuf> {
        if !self.render.save_source {
            return None;
        }
        let ext = self.render.backend.source_extension();
        Some(match &self.output {
            Some(output) => output.with_extension(ext),
            None => timestamped_path(&self.render.output_dir, &self.render.prefix, ext),
        })
    }

    fn echo(&self, text: &str) {
        if self.echo {
            println!("{}", text);
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub schema: Schema,
    pub relationships: RelationshipSet,
    /// Tokens spent on relationship inference
    pub usage: TokenUsage,
    pub diagram: DiagramArtifact,
}

pub struct Pipeline {
    store: SharedStore,
    provider: SharedProvider,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(store: SharedStore, provider: SharedProvider, options: PipelineOptions) -> Self {
        Self {
            store,
            provider,
            options,
        }
    }

    pub async fn run(&self) -> Result<PipelineReport> {
        let options = &self.options;

        options.echo("Extracting schema...\n");
        let schema = SchemaSampler::new(options.sample_limit)
            .sample(self.store.as_ref())
            .await?;
        options.echo("Schema extracted:");
        options.echo(&schema.to_pretty_json()?);

        options.echo("Identifying relationships...\n");
        let (relationships, usage) = RelationshipInferrer::new(self.provider.clone())
            .with_token_caps(options.relationship_max_tokens, options.format_max_tokens)
            .infer_with_usage(&schema)
            .await?;
        options.echo("Relationships identified:");
        options.echo(&to_pretty_json(&relationships)?);

        let diagram = render_diagram(&schema, &relationships, options).await?;

        info!(
            "Pipeline complete: {} collections, {} relationships",
            schema.len(),
            relationships.total()
        );

        Ok(PipelineReport {
            schema,
            relationships,
            usage,
            diagram,
        })
    }
}

/// Render stage on its own, shared by `run` and the `render` command
pub async fn render_diagram(
    schema: &Schema,
    relationships: &RelationshipSet,
    options: &PipelineOptions,
) -> Result<DiagramArtifact> {
    let renderer = create_renderer(&options.render)?;
    let target = options.image_target();

    options.echo(&format!("Generating {} diagram...\n", renderer.backend()));
    let mut artifact = renderer
        .render(
            schema,
            relationships,
            target.as_deref().map(|path| (path, options.render.format)),
        )
        .await?;

    options.echo("Diagram text generated:");
    options.echo(&artifact.source);
    if let Some(image) = &artifact.image {
        options.echo(&format!("Diagram saved as {}", image.path.display()));
    }

    if let Some(path) = options.source_target() {
        write_staged(&path, artifact.source.as_bytes())?;
        info!("Diagram source saved as {}", path.display());
        options.echo(&format!("Diagram source saved as {}", path.display()));
        artifact.source_path = Some(path);
    }

    Ok(artifact)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::ScriptedProvider;
    use crate::render::{ImageFormat, RenderBackend};
    use crate::schema::Relationship;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn blog_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_collection(
                    "users",
                    vec![json!({"name": "Ada", "email": "ada@example.com"})],
                )
                .with_collection(
                    "posts",
                    vec![
                        json!({"title": "Hello", "author": "u1"}),
                        json!({"title": "Again", "author": "u1", "tags": []}),
                    ],
                ),
        )
    }

    fn blog_provider() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new([
            "author references the users collection",
            "```json\n{\"author\": \"users\"}\n```",
            "None",
        ]))
    }

    fn text_only(backend: RenderBackend) -> PipelineOptions {
        let mut options = PipelineOptions {
            echo: false,
            ..PipelineOptions::default()
        };
        options.render.backend = backend;
        options.render.image = false;
        options
    }

    #[tokio::test]
    async fn test_full_run_to_plantuml_text() {
        let store = blog_store();
        let report = Pipeline::new(store.clone(), blog_provider(), text_only(RenderBackend::Uml))
            .run()
            .await
            .unwrap();

        let posts = report.schema.get("posts").and_then(|s| s.fields()).unwrap();
        assert_eq!(posts.as_slice(), ["title", "author", "tags"]);
        assert_eq!(
            report.relationships.get("posts"),
            &[Relationship::new("author", "users")]
        );
        assert!(report.relationships.get("users").is_empty());
        assert_eq!(report.usage.total(), 36);

        assert_eq!(report.diagram.backend, RenderBackend::Uml);
        assert!(report.diagram.image.is_none());
        assert!(
            report
                .diagram
                .source
                .contains("posts --> users : author")
        );

        assert_eq!(
            store.requests(),
            vec![("posts".to_string(), 50), ("users".to_string(), 50)]
        );
    }

    #[tokio::test]
    async fn test_options_from_config() {
        let mut config = Config::default();
        config.sampling.limit = 2;
        config.inference.relationship_max_tokens = 64;

        let mut options = PipelineOptions {
            echo: false,
            ..PipelineOptions::from(&config)
        };
        options.render.image = false;

        let store = blog_store();
        let provider = blog_provider();
        Pipeline::new(store.clone(), provider.clone(), options)
            .run()
            .await
            .unwrap();

        assert!(store.requests().iter().all(|(_, limit)| *limit == 2));
        assert_eq!(provider.calls()[0].1, 64);
    }

    #[tokio::test]
    async fn test_parse_failure_stops_before_render() {
        let provider = Arc::new(ScriptedProvider::new([
            "author references users",
            "{\"author\": \"users\"}",
        ]));
        let dir = tempfile::tempdir().unwrap();
        let mut options = text_only(RenderBackend::Graph);
        options.render.image = true;
        options.render.output_dir = dir.path().to_path_buf();

        let result = Pipeline::new(blog_store(), provider, options).run().await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_image_target() {
        let mut options = PipelineOptions::default();
        options.render.output_dir = PathBuf::from("out");
        options.render.format = ImageFormat::Svg;

        let generated = options.image_target().unwrap();
        assert_eq!(generated.parent(), Some(std::path::Path::new("out")));
        assert!(generated.to_string_lossy().ends_with(".svg"));

        options.output = Some(PathBuf::from("diagram.svg"));
        assert_eq!(options.image_target(), Some(PathBuf::from("diagram.svg")));

        options.render.image = false;
        assert_eq!(options.image_target(), None);
    }

    #[tokio::test]
    async fn test_save_source_writes_timestamped_puml() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = text_only(RenderBackend::Uml);
        options.render.save_source = true;
        options.render.output_dir = dir.path().to_path_buf();

        let report = Pipeline::new(blog_store(), blog_provider(), options)
            .run()
            .await
            .unwrap();

        let path = report.diagram.source_path.unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("schema_") && name.ends_with(".puml"), "{}", name);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), report.diagram.source);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_source_target() {
        let mut options = PipelineOptions::default();
        assert_eq!(options.source_target(), None);

        options.render.save_source = true;
        options.render.backend = RenderBackend::Graph;
        options.output = Some(PathBuf::from("out/blog.png"));
        assert_eq!(options.source_target(), Some(PathBuf::from("out/blog.dot")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_graph_image_written_to_explicit_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("blog.png");

        let mut options = text_only(RenderBackend::Graph);
        options.render.image = true;
        options.render.dot_binary = "true".to_string();
        options.output = Some(output.clone());

        let report = Pipeline::new(blog_store(), blog_provider(), options)
            .run()
            .await
            .unwrap();

        let image = report.diagram.image.unwrap();
        assert_eq!(image.path, output);
        assert!(output.exists());
        assert!(report.diagram.source.contains("\"posts\" -> \"users\""));
    }
}
