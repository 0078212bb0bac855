//! In-memory document store.
//!
//! Holds raw JSON records per collection and validates them on fetch, the same
//! way the other backends do. Records every requested limit so callers can
//! check how the store was queried.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Document, DocumentStore};
use crate::types::{Result, SchemaGenError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Value>>,
    /// Return every record regardless of the requested limit
    ignore_limit: bool,
    requests: Mutex<Vec<(String, usize)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection of raw records (builder style)
    pub fn with_collection(
        mut self,
        name: impl Into<String>,
        records: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.collections
            .insert(name.into(), records.into_iter().collect());
        self
    }

    /// Simulate a backend that does not honor the fetch limit
    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }

    /// (collection, limit) pairs of every fetch so far
    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.keys().cloned().collect())
    }

    async fn fetch_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((collection.to_string(), limit));
        }

        let records = self.collections.get(collection).ok_or_else(|| {
            SchemaGenError::Store(format!("Collection '{}' does not exist", collection))
        })?;

        let take = if self.ignore_limit {
            records.len()
        } else {
            limit
        };

        records
            .iter()
            .take(take)
            .enumerate()
            .map(|(index, value)| Document::from_value(collection, index.to_string(), value.clone()))
            .collect()
    }
}
