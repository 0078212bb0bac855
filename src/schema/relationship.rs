//! Inferred relationships between collections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A (field, target collection) pair suggesting a foreign-key-like reference.
///
/// Serialized as a two-element array `["field", "target"]`. Deserialization
/// also accepts `{"field": .., "target": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RelationshipRepr", into = "(String, String)")]
pub struct Relationship {
    pub field: String,
    pub target: String,
}

impl Relationship {
    pub fn new(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
        }
    }

    /// Copy with surrounding whitespace removed from both parts
    pub fn trimmed(&self) -> Self {
        Self::new(self.field.trim(), self.target.trim())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RelationshipRepr {
    Pair(String, String),
    Object { field: String, target: String },
}

impl From<RelationshipRepr> for Relationship {
    fn from(repr: RelationshipRepr) -> Self {
        match repr {
            RelationshipRepr::Pair(field, target) => Self { field, target },
            RelationshipRepr::Object { field, target } => Self { field, target },
        }
    }
}

impl From<Relationship> for (String, String) {
    fn from(rel: Relationship) -> Self {
        (rel.field, rel.target)
    }
}

/// Relationships keyed by source collection.
///
/// A collection that is absent or maps to an empty list has no known relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipSet {
    by_collection: BTreeMap<String, Vec<Relationship>>,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure an entry exists for `collection` (possibly empty)
    pub fn register(&mut self, collection: impl Into<String>) {
        self.by_collection.entry(collection.into()).or_default();
    }

    pub fn push(&mut self, collection: impl Into<String>, relationship: Relationship) {
        self.by_collection
            .entry(collection.into())
            .or_default()
            .push(relationship);
    }

    pub fn extend(
        &mut self,
        collection: impl Into<String>,
        relationships: impl IntoIterator<Item = Relationship>,
    ) {
        self.by_collection
            .entry(collection.into())
            .or_default()
            .extend(relationships);
    }

    /// Relationships of `collection`, empty when none are known
    pub fn get(&self, collection: &str) -> &[Relationship] {
        self.by_collection
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.by_collection.contains_key(collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Relationship])> {
        self.by_collection
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flattened (collection, field, target) triples in iteration order
    pub fn triples(&self) -> Vec<(String, String, String)> {
        self.iter()
            .flat_map(|(collection, rels)| {
                rels.iter().map(move |rel| {
                    (collection.to_string(), rel.field.clone(), rel.target.clone())
                })
            })
            .collect()
    }

    /// Total number of relationships across all collections
    pub fn total(&self) -> usize {
        self.by_collection.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn from_json_str(raw: &str) -> crate::types::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_pairs() {
        let mut set = RelationshipSet::new();
        set.push("posts", Relationship::new("author", "users"));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"posts":[["author","users"]]}"#);
    }

    #[test]
    fn test_deserializes_both_forms() {
        let set = RelationshipSet::from_json_str(
            r#"{"posts": [["author", "users"], {"field": "tagId", "target": "tags"}]}"#,
        )
        .unwrap();
        assert_eq!(
            set.get("posts"),
            &[
                Relationship::new("author", "users"),
                Relationship::new("tagId", "tags")
            ]
        );
    }

    #[test]
    fn test_registered_collection_is_empty() {
        let mut set = RelationshipSet::new();
        set.register("users");
        assert!(set.contains("users"));
        assert!(set.get("users").is_empty());
        assert!(set.get("missing").is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_trimmed() {
        let rel = Relationship::new("  userId ", "users\n");
        assert_eq!(rel.trimmed(), Relationship::new("userId", "users"));
    }
}
