//! Render Command
//!
//! Draw a diagram from saved schema / relationship JSON, without touching
//! the store or the model. Collections whose value is not a list of field
//! names are drawn with a placeholder.
//!
//! Usage:
//!   schemagen render --schema FILE [--relationships FILE] [--backend uml|graph]
//!                    [--output PATH] [--no-image] [--save-source]

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::cli::util::{RenderOverrides, load_config, runtime};
use crate::pipeline::{PipelineOptions, render_diagram};
use crate::schema::{RelationshipSet, Schema};
use crate::types::{Result, SchemaGenError};

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        SchemaGenError::Config(format!("Cannot read {}: {}", path.display(), e))
    })
}

pub fn run(
    config_path: Option<PathBuf>,
    schema_path: PathBuf,
    relationships_path: Option<PathBuf>,
    overrides: RenderOverrides,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;

    let schema = Schema::from_json_str(&read(&schema_path)?)?;
    let relationships = match relationships_path {
        Some(path) => RelationshipSet::from_json_str(&read(&path)?)?,
        None => RelationshipSet::new(),
    };

    let unrecognized = schema
        .iter()
        .filter(|(_, shape)| shape.fields().is_none())
        .count();

    let mut options = PipelineOptions::from(&config);
    overrides.apply(&mut options);

    let rt = runtime()?;
    let artifact = rt.block_on(render_diagram(&schema, &relationships, &options))?;

    let output = Output::new();
    if unrecognized > 0 {
        output.warning(&format!(
            "{} collections had no field list and were drawn as placeholders",
            unrecognized
        ));
    }
    match &artifact.image {
        Some(image) => output.success(&format!("Rendered {}", image.path.display())),
        None => output.success("Rendered diagram text"),
    }
    if let Some(path) = &artifact.source_path {
        output.info(&format!("Source: {}", path.display()));
    }
    Ok(())
}
