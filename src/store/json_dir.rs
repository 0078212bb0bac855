//! Local JSON export store.
//!
//! A directory where each `<collection>.json` holds an array of documents,
//! or each `<collection>.jsonl` holds one document per line.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{Document, DocumentStore};
use crate::types::{Result, SchemaGenError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Array,
    Lines,
}

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SchemaGenError::Store(format!(
                "Export directory not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn collection_file(&self, collection: &str) -> Result<(PathBuf, ExportFormat)> {
        let array = self.root.join(format!("{}.json", collection));
        if array.is_file() {
            return Ok((array, ExportFormat::Array));
        }
        let lines = self.root.join(format!("{}.jsonl", collection));
        if lines.is_file() {
            return Ok((lines, ExportFormat::Lines));
        }
        Err(SchemaGenError::Store(format!(
            "Collection '{}' not found in {}",
            collection,
            self.root.display()
        )))
    }
}

fn export_format(path: &Path) -> Option<ExportFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(ExportFormat::Array),
        Some("jsonl") => Some(ExportFormat::Lines),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for JsonDirStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut collections = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() || export_format(&path).is_none() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if collections.iter().any(|c| c == stem) {
                    warn!("Both .json and .jsonl exports exist for '{}'; using .json", stem);
                    continue;
                }
                collections.push(stem.to_string());
            }
        }

        collections.sort();
        Ok(collections)
    }

    async fn fetch_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
        let (path, format) = self.collection_file(collection)?;
        debug!("Reading up to {} documents from {}", limit, path.display());
        let content = tokio::fs::read_to_string(&path).await?;

        let raw: Vec<Value> = match format {
            ExportFormat::Array => match serde_json::from_str::<Value>(&content)? {
                Value::Array(items) => items.into_iter().take(limit).collect(),
                _ => {
                    return Err(SchemaGenError::invalid_record(
                        collection,
                        format!("{} must contain a JSON array", path.display()),
                    ));
                }
            },
            ExportFormat::Lines => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .take(limit)
                .map(serde_json::from_str::<Value>)
                .collect::<std::result::Result<_, _>>()?,
        };

        raw.into_iter()
            .enumerate()
            .map(|(index, value)| Document::from_value(collection, index.to_string(), value))
            .collect()
    }
}
