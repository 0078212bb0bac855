//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Schema sampling constants
pub mod sampling {
    /// Maximum documents inspected per collection
    pub const DEFAULT_SAMPLE_LIMIT: usize = 50;
}

/// Relationship inference constants
pub mod inference {
    /// Output cap for the first-stage relationship question
    pub const RELATIONSHIP_MAX_TOKENS: usize = 512;

    /// Output cap for the second-stage reformatting request
    pub const FORMAT_MAX_TOKENS: usize = 150;

    /// Sentinel the model is told to answer with when nothing is found
    pub const NO_RELATIONSHIPS_SENTINEL: &str = "None";
}

/// LLM provider constants
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "openai";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
    pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:latest";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const OLLAMA_API_BASE: &str = "http://localhost:11434";
}

/// Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default document store / render request timeout (seconds)
    pub const STORE_TIMEOUT_SECS: u64 = 60;
}

/// Document store constants
pub mod store {
    pub const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";
    pub const DEFAULT_DATABASE: &str = "(default)";
    pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
    pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
}

/// Diagram rendering constants
pub mod render {
    pub const PLANTUML_SERVER: &str = "http://www.plantuml.com/plantuml";
    pub const DOT_BINARY: &str = "dot";
    pub const OUTPUT_PREFIX: &str = "schema";

    /// strftime pattern embedded in output filenames
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

    /// Placeholder emitted for collections whose schema value is not a field list
    pub const INVALID_SCHEMA_PLACEHOLDER: &str = "// Invalid schema format";
}
