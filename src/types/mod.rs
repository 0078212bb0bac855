pub mod error;

pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, ParseErrorKind, Result, SchemaGenError,
};
