//! Document Store Abstraction
//!
//! Defines the read-only [`DocumentStore`] collaborator the sampler consumes:
//! list every collection, then fetch a bounded number of documents per
//! collection. Backends validate raw records at this boundary so the sampler
//! only ever sees field-keyed objects.
//!
//! ## Backends
//!
//! - `firestore`: Cloud Firestore REST API
//! - `json_dir`: Directory of exported `<collection>.json` / `.jsonl` files
//! - `memory`: In-memory collections (tests, demos)

mod firestore;
mod json_dir;
mod memory;

pub use firestore::FirestoreStore;
pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::schema::json_kind;
use crate::types::{Result, SchemaGenError};

/// A single field-keyed record
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Validate a raw JSON record before field extraction.
    ///
    /// Only JSON objects are documents; anything else is an
    /// [`SchemaGenError::InvalidRecord`].
    pub fn from_value(collection: &str, id: impl Into<String>, value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(id, fields)),
            other => Err(SchemaGenError::invalid_record(
                collection,
                format!("expected an object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Top-level field names in document order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Shared store handle passed between pipeline stages
pub type SharedStore = Arc<dyn DocumentStore>;

/// Read-only document database collaborator
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Complete list of top-level collection ids
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Fetch at most `limit` documents from `collection`
    async fn fetch_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>>;
}

/// Create a shared store from configuration
pub fn create_store(config: &StoreConfig) -> Result<SharedStore> {
    match config.backend {
        StoreBackend::Firestore => Ok(Arc::new(FirestoreStore::new(config)?)),
        StoreBackend::Json => {
            let path = config.path.clone().ok_or_else(|| {
                SchemaGenError::Config(
                    "store.path is required for the json backend (use --data DIR)".to_string(),
                )
            })?;
            Ok(Arc::new(JsonDirStore::new(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_from_object() {
        let doc = Document::from_value("users", "u1", json!({"name": "a", "email": "b"})).unwrap();
        let names: Vec<_> = doc.field_names().collect();
        assert_eq!(names, vec!["name", "email"]);
    }

    #[test]
    fn test_document_rejects_non_object() {
        let err = Document::from_value("users", "u1", json!(["name"])).unwrap_err();
        match err {
            SchemaGenError::InvalidRecord { collection, reason } => {
                assert_eq!(collection, "users");
                assert!(reason.contains("array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_backend_requires_path() {
        let config = StoreConfig {
            backend: StoreBackend::Json,
            path: None,
            ..StoreConfig::default()
        };
        assert!(matches!(
            create_store(&config),
            Err(SchemaGenError::Config(_))
        ));
    }
}
