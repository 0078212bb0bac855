//! Relationship Inference
//!
//! Asks the language model, one collection at a time, which fields look like
//! references to other collections. Each collection takes up to two calls:
//!
//! 1. A free-text question answered in prose (or the `None` sentinel)
//! 2. A reformatting request whose fenced JSON answer is parsed into
//!    [`Relationship`](crate::schema::Relationship) pairs
//!
//! Calls are issued strictly one after another.

pub mod parser;
pub mod prompts;

pub use parser::{extract_fenced_block, parse_fenced_mapping};
pub use prompts::{build_format_prompt, build_relationship_prompt};

use tracing::{debug, info};

use crate::ai::{SharedProvider, TokenUsage};
use crate::constants::inference::{
    FORMAT_MAX_TOKENS, NO_RELATIONSHIPS_SENTINEL, RELATIONSHIP_MAX_TOKENS,
};
use crate::schema::{RelationshipSet, Schema};
use crate::types::Result;

/// Two-stage relationship inferrer over a shared provider
pub struct RelationshipInferrer {
    provider: SharedProvider,
    relationship_max_tokens: usize,
    format_max_tokens: usize,
}

impl RelationshipInferrer {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            relationship_max_tokens: RELATIONSHIP_MAX_TOKENS,
            format_max_tokens: FORMAT_MAX_TOKENS,
        }
    }

    /// Override the per-stage output caps
    pub fn with_token_caps(mut self, relationship_max_tokens: usize, format_max_tokens: usize) -> Self {
        self.relationship_max_tokens = relationship_max_tokens;
        self.format_max_tokens = format_max_tokens;
        self
    }

    /// Infer relationships for every collection in `schema`.
    ///
    /// Every collection gets an entry, empty when the model reports nothing.
    /// The first provider or parse failure aborts the whole run.
    pub async fn infer(&self, schema: &Schema) -> Result<RelationshipSet> {
        Ok(self.infer_with_usage(schema).await?.0)
    }

    /// [`infer`](Self::infer), plus the token usage summed over every call
    pub async fn infer_with_usage(&self, schema: &Schema) -> Result<(RelationshipSet, TokenUsage)> {
        let schema_context = schema.to_pretty_json()?;
        let mut relationships = RelationshipSet::new();
        let mut usage = TokenUsage::default();

        info!(
            "Inferring relationships for {} collections with {} ({})",
            schema.len(),
            self.provider.name(),
            self.provider.model()
        );

        for collection in schema.collection_names() {
            relationships.register(collection);

            let prompt = build_relationship_prompt(&schema_context, collection);
            let response = self
                .provider
                .complete(&prompt, self.relationship_max_tokens)
                .await?;
            usage.add(&response.usage);
            let answer = response.content.trim();

            // Substring match: an answer that merely mentions "None" is also skipped
            if answer.is_empty() || answer.contains(NO_RELATIONSHIPS_SENTINEL) {
                debug!("No relationships reported for '{}'", collection);
                continue;
            }

            let response = self
                .provider
                .complete(&build_format_prompt(answer), self.format_max_tokens)
                .await?;
            usage.add(&response.usage);
            let found = parse_fenced_mapping(response.content.trim())?;

            debug!("'{}': {} relationships", collection, found.len());
            relationships.extend(collection, found);
        }

        info!(
            "Inferred {} relationships ({} tokens: {} in, {} out)",
            relationships.total(),
            usage.total(),
            usage.input_tokens,
            usage.output_tokens
        );
        Ok((relationships, usage))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::ai::{LlmProvider, LlmResponse, TokenUsage};
    use crate::types::{Result, SchemaGenError};

    /// Usage reported for every scripted answer
    pub const CALL_USAGE: (u32, u32) = (10, 2);

    /// Provider that replays canned answers and records every call
    #[derive(Default)]
    pub struct ScriptedProvider {
        answers: Mutex<VecDeque<String>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedProvider {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, prompt: &str, max_tokens: usize) -> Result<LlmResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .map(|answer| LlmResponse {
                    usage: TokenUsage::from_openai(CALL_USAGE.0, CALL_USAGE.1),
                    ..LlmResponse::content_only(answer)
                })
                .ok_or_else(|| SchemaGenError::Store("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
