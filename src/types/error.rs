//! Unified Error Type System
//!
//! Centralized error types for the whole pipeline. Each collaborator boundary
//! (document store, language model, renderer) produces its own distinguishable
//! variant so callers can tell a database failure from a malformed model answer.
//!
//! ## Error Categories (LLM)
//!
//! - **RateLimit**: API rate limiting
//! - **Auth**: Authentication failures
//! - **Network**: Connectivity issues
//! - **Unavailable**: Provider unavailable
//! - **BadRequest**: Rejected request
//!
//! Categories are informational only. Nothing in the pipeline retries.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Classification of language-model failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps provider failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 => {
                let lower = message.to_lowercase();
                if lower.contains("context length") || lower.contains("maximum context") {
                    ErrorCategory::TokenLimit
                } else {
                    ErrorCategory::BadRequest
                }
            }
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            404 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport-level failure (no HTTP status available)
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::BadRequest
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Model Output Parse Errors
// =============================================================================

/// Why a model answer could not be turned into a field→collection mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No opening code fence found
    MissingFence,
    /// Opening fence without a closing fence
    UnterminatedFence,
    /// Fence body is not valid JSON
    InvalidJson,
    /// JSON is valid but not an object of string values
    UnexpectedShape,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFence => write!(f, "missing code fence"),
            Self::UnterminatedFence => write!(f, "unterminated code fence"),
            Self::InvalidJson => write!(f, "invalid JSON"),
            Self::UnexpectedShape => write!(f, "unexpected mapping shape"),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SchemaGenError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("Document store error: {0}")]
    Store(String),

    #[error("Invalid document in collection '{collection}': {reason}")]
    InvalidRecord { collection: String, reason: String },

    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Malformed model output ({kind}): {preview}")]
    ModelOutput {
        kind: ParseErrorKind,
        preview: String,
    },

    #[error("Render error: {0}")]
    Render(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Invalid schema for '{collection}': {reason}")]
    SchemaShape { collection: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

impl From<LlmError> for SchemaGenError {
    fn from(err: LlmError) -> Self {
        SchemaGenError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, SchemaGenError>;

// =============================================================================
// Helper Functions
// =============================================================================

/// Maximum characters of raw model text carried in a parse error
const PREVIEW_CHARS: usize = 200;

impl SchemaGenError {
    /// Create a model-output error with a bounded preview of the offending text
    pub fn model_output(kind: ParseErrorKind, raw: &str) -> Self {
        Self::ModelOutput {
            kind,
            preview: raw.chars().take(PREVIEW_CHARS).collect(),
        }
    }

    pub fn invalid_record(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Parse-error kind, if this error came from model output validation
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            Self::ModelOutput { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::TokenLimit.to_string(), "TOKEN_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "test");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);

        let context = ErrorClassifier::classify_http_status(
            400,
            "This model's maximum context length is 128000 tokens",
            "openai",
        );
        assert_eq!(context.category, ErrorCategory::TokenLimit);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_model_output_preview_is_bounded() {
        let raw = "x".repeat(1000);
        let err = SchemaGenError::model_output(ParseErrorKind::InvalidJson, &raw);
        match &err {
            SchemaGenError::ModelOutput { preview, .. } => assert_eq!(preview.len(), 200),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::InvalidJson));
    }

    #[test]
    fn test_invalid_record_display() {
        let err = SchemaGenError::invalid_record("users", "expected object, got array");
        assert_eq!(
            err.to_string(),
            "Invalid document in collection 'users': expected object, got array"
        );
    }
}
