//! AI Integration Layer
//!
//! Provides the language-model collaborator used for relationship inference.

pub mod provider;

pub use provider::{
    ErrorCategory, ErrorClassifier, LlmError, LlmProvider, LlmResponse, OllamaProvider,
    OpenAiProvider, ProviderConfig, SharedProvider, TokenUsage,
    create_provider,
};
