//! Inferred Schema Model
//!
//! A [`Schema`] maps each collection name to the shape observed for it. The
//! sampler only ever produces field lists. Schemas loaded from user-supplied
//! JSON may carry other shapes, which are kept as [`CollectionShape::Unrecognized`]
//! so renderers can dispatch on them instead of failing.

mod relationship;
pub mod sampler;

pub use relationship::{Relationship, RelationshipSet};
pub use sampler::SchemaSampler;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{Result, SchemaGenError};

// =============================================================================
// Field List
// =============================================================================

/// Ordered, duplicate-free list of field names (first-seen order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldList(Vec<String>);

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field unless it is already present. Returns true when added.
    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.0.contains(&field) {
            return false;
        }
        self.0.push(field);
        true
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for FieldList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = FieldList::new();
        for field in iter {
            list.insert(field);
        }
        list
    }
}

// =============================================================================
// Collection Shape
// =============================================================================

/// Shape of one collection's schema value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionShape {
    /// Proper ordered field list
    Fields(FieldList),
    /// Anything else (e.g. a key-value mapping), kept verbatim
    Unrecognized(Value),
}

impl CollectionShape {
    /// Classify a raw JSON value: an array of strings is a field list,
    /// everything else is unrecognized.
    pub fn from_value(value: &Value) -> Self {
        if let Value::Array(items) = value {
            let names: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            if let Some(names) = names {
                return Self::Fields(names.into_iter().collect());
            }
        }
        Self::Unrecognized(value.clone())
    }

    pub fn fields(&self) -> Option<&FieldList> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::Unrecognized(_) => None,
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Per-collection observed fields, in sorted collection order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    collections: BTreeMap<String, CollectionShape>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: impl Into<String>, shape: CollectionShape) {
        self.collections.insert(collection.into(), shape);
    }

    pub fn insert_fields(&mut self, collection: impl Into<String>, fields: FieldList) {
        self.insert(collection, CollectionShape::Fields(fields));
    }

    pub fn get(&self, collection: &str) -> Option<&CollectionShape> {
        self.collections.get(collection)
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CollectionShape)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Human-readable JSON block embedded in model prompts (two-space indent)
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a schema from `{"collection": [fields...], ...}` JSON.
    ///
    /// The root must be an object. Individual collection values are
    /// classified with [`CollectionShape::from_value`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| SchemaGenError::SchemaShape {
            collection: "<root>".to_string(),
            reason: format!("expected an object of collections, got {}", json_kind(value)),
        })?;

        let mut schema = Schema::new();
        for (name, raw) in object {
            schema.insert(name.clone(), CollectionShape::from_value(raw));
        }
        Ok(schema)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value)
    }
}

/// Short JSON type name for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_field_list_suppresses_duplicates() {
        let mut fields = FieldList::new();
        assert!(fields.insert("a"));
        assert!(fields.insert("b"));
        assert!(!fields.insert("a"));
        assert_eq!(fields.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_shape_classification() {
        let fields = CollectionShape::from_value(&json!(["name", "email", "name"]));
        assert_eq!(
            fields.fields().map(|f| f.as_slice().to_vec()),
            Some(vec!["name".to_string(), "email".to_string()])
        );

        let mapping = CollectionShape::from_value(&json!({"name": "string"}));
        assert!(matches!(mapping, CollectionShape::Unrecognized(_)));

        let mixed = CollectionShape::from_value(&json!(["name", 3]));
        assert!(matches!(mixed, CollectionShape::Unrecognized(_)));
    }

    #[test]
    fn test_schema_from_json_rejects_non_object_root() {
        let err = Schema::from_json(&json!(["users"])).unwrap_err();
        assert!(matches!(err, SchemaGenError::SchemaShape { .. }));
    }

    #[test]
    fn test_schema_pretty_json_round_trips() {
        let mut schema = Schema::new();
        schema.insert_fields("users", ["name", "email"].into_iter().collect());
        schema.insert("legacy", CollectionShape::Unrecognized(json!({"k": "v"})));

        let text = schema.to_pretty_json().unwrap();
        assert!(text.contains("  \"users\": ["));

        let reloaded = Schema::from_json_str(&text).unwrap();
        assert_eq!(reloaded, schema);
    }

    #[test]
    fn test_schema_iterates_in_sorted_order() {
        let mut schema = Schema::new();
        schema.insert_fields("users", FieldList::new());
        schema.insert_fields("orders", FieldList::new());
        let names: Vec<_> = schema.collection_names().collect();
        assert_eq!(names, vec!["orders", "users"]);
    }

    proptest! {
        #[test]
        fn prop_field_list_unique_and_first_seen(input in proptest::collection::vec("[a-e]", 0..40)) {
            let list: FieldList = input.iter().cloned().collect();

            let mut seen = std::collections::HashSet::new();
            for field in list.iter() {
                prop_assert!(seen.insert(field.to_string()));
            }

            let mut expected: Vec<String> = Vec::new();
            for field in &input {
                if !expected.contains(field) {
                    expected.push(field.clone());
                }
            }
            prop_assert_eq!(list.as_slice(), expected.as_slice());
        }
    }
}
