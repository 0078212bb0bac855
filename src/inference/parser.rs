//! Fenced Mapping Parser
//!
//! Extracts the `{"field": "collection"}` object the model is asked to wrap in
//! a Markdown code fence. The fence is located by search, never by fixed
//! offsets. Each failure mode maps to its own [`ParseErrorKind`].

use serde_json::Value;

use crate::schema::{Relationship, json_kind};
use crate::types::{ParseErrorKind, Result, SchemaGenError};

const FENCE: &str = "```";

/// Return the text between the first code fence pair.
///
/// An info string after the opening fence (`json`, `python`, ...) is
/// skipped, including when spaces separate it from the fence.
pub fn extract_fenced_block(raw: &str) -> Result<&str> {
    let open = raw
        .find(FENCE)
        .ok_or_else(|| SchemaGenError::model_output(ParseErrorKind::MissingFence, raw))?;

    let after_open = raw[open + FENCE.len()..].trim_start_matches([' ', '\t']);
    let info_len = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .unwrap_or(after_open.len());
    let body = &after_open[info_len..];

    let close = body
        .find(FENCE)
        .ok_or_else(|| SchemaGenError::model_output(ParseErrorKind::UnterminatedFence, raw))?;

    Ok(body[..close].trim())
}

/// Parse a fenced field→collection mapping into relationships, in document order
pub fn parse_fenced_mapping(raw: &str) -> Result<Vec<Relationship>> {
    let block = extract_fenced_block(raw)?;

    let value: Value = serde_json::from_str(block)
        .map_err(|_| SchemaGenError::model_output(ParseErrorKind::InvalidJson, raw))?;

    let Value::Object(mapping) = value else {
        return Err(SchemaGenError::ModelOutput {
            kind: ParseErrorKind::UnexpectedShape,
            preview: format!("expected an object, got {}", json_kind(&value)),
        });
    };

    mapping
        .into_iter()
        .map(|(field, target)| match target {
            Value::String(target) => Ok(Relationship::new(field, target)),
            other => Err(SchemaGenError::ModelOutput {
                kind: ParseErrorKind::UnexpectedShape,
                preview: format!(
                    "value for '{}' must be a collection name, got {}",
                    field,
                    json_kind(&other)
                ),
            }),
        })
        .collect()
}
