//! PlantUML Renderer
//!
//! Emits a class diagram with one class block per collection and one arrow
//! per relationship. Images come from a PlantUML server using its hex text
//! encoding (`GET {server}/{format}/~h{hex}`).

use async_trait::async_trait;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use super::output::write_staged;
use super::{DiagramRenderer, ImageFormat, RenderBackend};
use crate::config::RenderConfig;
use crate::constants::render::INVALID_SCHEMA_PLACEHOLDER;
use crate::schema::{CollectionShape, RelationshipSet, Schema};
use crate::types::{Result, SchemaGenError};

// Matches the exact separators `to_plantuml` writes; captures are not trimmed
static ARROW_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?) --> (.*?) : (.*)$").expect("valid arrow regex"));

/// Build the `@startuml` ... `@enduml` document.
///
/// Field names and relationship values are emitted verbatim.
pub fn to_plantuml(schema: &Schema, relationships: &RelationshipSet) -> String {
    let mut lines = vec!["@startuml".to_string()];

    for (collection, shape) in schema.iter() {
        lines.push(format!("class {} {{", collection));
        match shape {
            CollectionShape::Fields(fields) => {
                lines.extend(fields.iter().map(|field| format!("  {}", field)));
            }
            CollectionShape::Unrecognized(_) => {
                lines.push(format!("  {}", INVALID_SCHEMA_PLACEHOLDER));
            }
        }
        lines.push("}".to_string());
    }

    for (collection, rels) in relationships.iter() {
        for rel in rels {
            lines.push(format!("{} --> {} : {}", collection, rel.target, rel.field));
        }
    }

    lines.push("@enduml".to_string());
    lines.join("\n")
}

/// Read `(collection, field, target)` triples back out of arrow lines
pub fn parse_arrows(text: &str) -> Vec<(String, String, String)> {
    text.lines()
        .filter_map(|line| ARROW_LINE.captures(line))
        .map(|caps| (caps[1].to_string(), caps[3].to_string(), caps[2].to_string()))
        .collect()
}

/// Server URL for rendering `text` as `format`
pub fn diagram_url(server: &str, format: ImageFormat, text: &str) -> String {
    format!(
        "{}/{}/~h{}",
        server.trim_end_matches('/'),
        format.extension(),
        hex::encode(text.as_bytes())
    )
}

pub struct PlantUmlRenderer {
    server: String,
    client: reqwest::Client,
}

impl PlantUmlRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let url = url::Url::parse(&config.plantuml_server).map_err(|e| {
            SchemaGenError::Config(format!(
                "Invalid PlantUML server URL '{}': {}",
                config.plantuml_server, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SchemaGenError::Config(format!(
                "PlantUML server must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchemaGenError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            server: config.plantuml_server.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch(&self, text: &str, format: ImageFormat) -> Result<Vec<u8>> {
        let url = diagram_url(&self.server, format, text);
        debug!("Requesting {} diagram from {}", format, self.server);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SchemaGenError::Render(format!(
                "PlantUML server returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DiagramRenderer for PlantUmlRenderer {
    fn backend(&self) -> RenderBackend {
        RenderBackend::Uml
    }

    fn to_source(&self, schema: &Schema, relationships: &RelationshipSet) -> String {
        to_plantuml(schema, relationships)
    }

    async fn render_image(&self, source: &str, output: &Path, format: ImageFormat) -> Result<()> {
        // Removed on drop, whichever way this returns
        let mut input = tempfile::Builder::new()
            .prefix("schemagen-")
            .suffix(".puml")
            .tempfile()?;
        input.write_all(source.as_bytes())?;
        input.flush()?;

        let text = tokio::fs::read_to_string(input.path()).await?;
        let image = self.fetch(&text, format).await?;

        write_staged(output, &image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::parser::parse_fenced_mapping;
    use crate::schema::{FieldList, Relationship};
    use proptest::prelude::*;
    use serde_json::json;

    fn blog() -> (Schema, RelationshipSet) {
        let mut schema = Schema::new();
        schema.insert_fields("users", FieldList::from_iter(["name", "email"]));
        schema.insert_fields("posts", FieldList::from_iter(["title", "author"]));

        let mut rels = RelationshipSet::new();
        rels.push("posts", Relationship::new("author", "users"));
        rels.register("users");
        (schema, rels)
    }

    #[test]
    fn test_document_markers() {
        let (schema, rels) = blog();
        let text = to_plantuml(&schema, &rels);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"@startuml"));
        assert_eq!(lines.last(), Some(&"@enduml"));
    }

    #[test]
    fn test_blog_example() {
        let (schema, rels) = blog();
        let text = to_plantuml(&schema, &rels);

        assert_eq!(
            text,
            "@startuml\n\
             class posts {\n  title\n  author\n}\n\
             class users {\n  name\n  email\n}\n\
             posts --> users : author\n\
             @enduml"
        );
        assert_eq!(text.matches(" --> ").count(), 1);
    }

    #[test]
    fn test_unrecognized_shape_placeholder() {
        let mut schema = Schema::new();
        schema.insert(
            "settings",
            CollectionShape::from_value(&json!({"theme": "string"})),
        );
        let text = to_plantuml(&schema, &RelationshipSet::new());
        assert!(text.contains("class settings {\n  // Invalid schema format\n}"));
    }

    #[test]
    fn test_empty_diagram() {
        assert_eq!(
            to_plantuml(&Schema::new(), &RelationshipSet::new()),
            "@startuml\n@enduml"
        );
    }

    #[test]
    fn test_arrows_round_trip() {
        let (schema, mut rels) = blog();
        rels.push("posts", Relationship::new("editorId", "users"));
        rels.push("users", Relationship::new("team", "teams"));

        let text = to_plantuml(&schema, &rels);
        assert_eq!(parse_arrows(&text), rels.triples());
    }

    #[test]
    fn test_arrows_keep_padding_and_spaces() {
        let mut rels = RelationshipSet::new();
        rels.extend(
            "posts",
            parse_fenced_mapping("```json\n{\" author \": \" users \"}\n```").unwrap(),
        );
        rels.push("posts", Relationship::new("profile", "user profiles"));

        let text = to_plantuml(&Schema::new(), &rels);
        assert_eq!(
            parse_arrows(&text),
            vec![
                ("posts".to_string(), " author ".to_string(), " users ".to_string()),
                ("posts".to_string(), "profile".to_string(), "user profiles".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_arrows_ignores_class_lines() {
        assert!(parse_arrows("@startuml\nclass a {\n  b\n}\n@enduml").is_empty());
    }

    #[test]
    fn test_diagram_url_hex_encoding() {
        assert_eq!(
            diagram_url("http://example.com/plantuml/", ImageFormat::Png, "@startuml"),
            "http://example.com/plantuml/png/~h407374617274756d6c"
        );
    }

    #[test]
    fn test_rejects_non_http_server() {
        let result = PlantUmlRenderer::new(&RenderConfig {
            plantuml_server: "ftp://example.com".to_string(),
            ..RenderConfig::default()
        });
        assert!(matches!(result, Err(SchemaGenError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_leaves_no_artifact() {
        let renderer = PlantUmlRenderer::new(&RenderConfig {
            plantuml_server: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..RenderConfig::default()
        })
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("schema.png");
        let (schema, rels) = blog();
        let result = renderer
            .render_image(&to_plantuml(&schema, &rels), &output, ImageFormat::Png)
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_arrows_round_trip(
            entries in proptest::collection::vec(
                ("[a-z ]{0,8}", proptest::collection::vec(("[a-zA-Z_ ]{0,10}", "[a-z ]{0,10}"), 0..4)),
                0..5,
            )
        ) {
            let mut rels = RelationshipSet::new();
            for (collection, pairs) in &entries {
                rels.extend(
                    collection.clone(),
                    pairs.iter().map(|(field, target)| Relationship::new(field.clone(), target.clone())),
                );
            }

            let text = to_plantuml(&Schema::new(), &rels);
            prop_assert_eq!(parse_arrows(&text), rels.triples());
        }
    }
}
