//! Cloud Firestore Document Store
//!
//! Reads collections through the Firestore REST API (v1).
//! Only top-level field names are needed, so typed values
//! (`stringValue`, `mapValue`, ...) are passed through undecoded.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::{Document, DocumentStore};
use crate::config::StoreConfig;
use crate::constants::store as store_constants;
use crate::types::{Result, SchemaGenError};

/// Page size used while enumerating collection ids
const COLLECTION_PAGE_SIZE: usize = 300;

/// Firestore REST store with secure access-token handling
pub struct FirestoreStore {
    api_base: String,
    project_id: String,
    database: String,
    /// OAuth access token, never exposed in logs or debug output
    access_token: Option<SecretString>,
    client: reqwest::Client,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("api_base", &self.api_base)
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl FirestoreStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .or_else(|| std::env::var(store_constants::PROJECT_ENV).ok())
            .ok_or_else(|| {
                SchemaGenError::Config(format!(
                    "Firestore project id not found. Set store.project_id, --project or {}",
                    store_constants::PROJECT_ENV
                ))
            })?;

        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var(store_constants::ACCESS_TOKEN_ENV).ok())
            .map(SecretString::from);

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| store_constants::FIRESTORE_API_BASE.to_string());
        let api_base = validate_endpoint(&api_base)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchemaGenError::Store(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            project_id,
            database: config.database.clone(),
            access_token,
            client,
        })
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.api_base, self.project_id, self.database
        )
    }

    /// `documents/{collection}` with the id escaped as a single path segment
    fn collection_url(&self, collection: &str) -> Result<url::Url> {
        let root = self.documents_root();
        let mut url = url::Url::parse(&root).map_err(|e| {
            SchemaGenError::Config(format!("Invalid Firestore endpoint '{}': {}", root, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SchemaGenError::Config(format!("Firestore endpoint '{}' cannot be a base", root))
            })?
            .push(collection);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn read_json(response: reqwest::Response, operation: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SchemaGenError::Store(format!(
                "Firestore {} failed ({}): {}",
                operation, status, body
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let url = format!("{}:listCollectionIds", self.documents_root());
        let mut collections = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = ListCollectionIdsRequest {
                page_size: COLLECTION_PAGE_SIZE,
                page_token: page_token.take(),
            };
            debug!("Listing Firestore collections: {}", url);

            let response = self
                .authorize(self.client.post(&url))
                .json(&request)
                .send()
                .await?;
            let body = Self::read_json(response, "listCollectionIds").await?;
            let page: ListCollectionIdsResponse = serde_json::from_value(body)?;

            collections.extend(page.collection_ids);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(
            "Found {} collections in project {}",
            collections.len(),
            self.project_id
        );
        Ok(collections)
    }

    async fn fetch_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
        let url = self.collection_url(collection)?;
        debug!("Fetching up to {} documents from {}", limit, url);

        let response = self
            .authorize(self.client.get(url))
            .query(&[("pageSize", limit)])
            .send()
            .await?;
        let body = Self::read_json(response, "list documents").await?;

        decode_documents(collection, body)
    }
}

/// Decode a `documents.list` response body into validated documents
pub(crate) fn decode_documents(collection: &str, body: Value) -> Result<Vec<Document>> {
    let Value::Object(mut root) = body else {
        return Err(SchemaGenError::invalid_record(
            collection,
            "list response is not an object",
        ));
    };

    let entries = match root.remove("documents") {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(SchemaGenError::invalid_record(
                collection,
                "'documents' is not an array",
            ));
        }
    };

    entries
        .into_iter()
        .map(|entry| decode_document(collection, entry))
        .collect()
}

fn decode_document(collection: &str, entry: Value) -> Result<Document> {
    let Value::Object(mut entry) = entry else {
        return Err(SchemaGenError::invalid_record(
            collection,
            "document entry is not an object",
        ));
    };

    let id = entry
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())
        .unwrap_or_default()
        .to_string();

    let fields = match entry.remove("fields") {
        None => Map::new(),
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            return Err(SchemaGenError::invalid_record(
                collection,
                format!("document '{}' has non-object 'fields'", id),
            ));
        }
    };

    Ok(Document::new(id, fields))
}

/// Only allow http/https endpoints; strip the trailing slash
fn validate_endpoint(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        SchemaGenError::Config(format!("Invalid Firestore endpoint '{}': {}", endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SchemaGenError::Config(format!(
            "Firestore endpoint must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListCollectionIdsRequest {
    page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCollectionIdsResponse {
    #[serde(default)]
    collection_ids: Vec<String>,
    next_page_token: Option<String>,
}
