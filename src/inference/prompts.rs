//! Relationship Inference Prompts
//!
//! Two prompts per collection: the first asks the model to name
//! foreign-key-like relationships in prose, the second asks it to restate
//! that prose as a fenced JSON mapping.

use crate::constants::inference::NO_RELATIONSHIPS_SENTINEL;

/// First-stage prompt: identify relationships for one collection.
///
/// `schema_context` is the whole schema rendered as pretty JSON.
pub fn build_relationship_prompt(schema_context: &str, collection: &str) -> String {
    format!(
        "Given the following schema:\n\n{schema_context}\n\n\
         Identify any foreign key relationships within the fields of the collection '{collection}'. \
         Provide the field name and the related collection if possible. \
         Do not share any relationships that are not present in the provided schema. \
         If no relationships are found, respond with {sentinel} and nothing else.",
        sentinel = NO_RELATIONSHIPS_SENTINEL,
    )
}

/// Second-stage prompt: reformat the first answer as a field→collection mapping
pub fn build_format_prompt(relationships_text: &str) -> String {
    format!(
        "Given the identified relationships, convert them into a JSON object where each key \
         is a field name and each value is the related collection. \
         Do not share anything other than the JSON object, wrapped in a ```json code block.\n\
         Format: {{\"field_name\": \"related_collection\"}}. \
         Example: {{\"userId\": \"users\", \"orderId\": \"orders\"}}\n\
         RELATIONSHIPS:\n{relationships_text}\n\
         DICT OUTPUT:"
    )
}
