//! Schema Sampler
//!
//! Bounded scan over every collection: fetch at most `limit` documents and
//! union their top-level field names in first-seen order. Nested maps and
//! subcollections are not recursed into.

use tracing::{info, warn};

use super::{FieldList, Schema};
use crate::constants::sampling::DEFAULT_SAMPLE_LIMIT;
use crate::store::DocumentStore;
use crate::types::Result;

#[derive(Debug, Clone, Copy)]
pub struct SchemaSampler {
    limit: usize,
}

impl Default for SchemaSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

impl SchemaSampler {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sample every collection of `store` sequentially
    pub async fn sample(&self, store: &dyn DocumentStore) -> Result<Schema> {
        let collections = store.list_collections().await?;
        info!(
            "Sampling {} collections from {} (limit {} documents each)",
            collections.len(),
            store.name(),
            self.limit
        );

        let mut schema = Schema::new();
        for collection in collections {
            let documents = store.fetch_documents(&collection, self.limit).await?;
            if documents.len() > self.limit {
                warn!(
                    "{} returned {} documents for '{}'; inspecting the first {}",
                    store.name(),
                    documents.len(),
                    collection,
                    self.limit
                );
            }

            let inspected = documents.len().min(self.limit);
            let fields: FieldList = documents
                .iter()
                .take(self.limit)
                .flat_map(|doc| doc.field_names())
                .collect();

            info!(
                "Collection '{}': {} documents, {} fields",
                collection,
                inspected,
                fields.len()
            );
            schema.insert_fields(collection, fields);
        }

        Ok(schema)
    }
}
