//! Configuration Types
//!
//! All configuration sections with their defaults. Every section is
//! `#[serde(default)]`, so partial TOML files and single env overrides work.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{inference, llm, network, render, sampling, store};
use crate::render::{ImageFormat, RenderBackend};
use crate::types::{Result, SchemaGenError};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings
    pub llm: LlmConfig,

    /// Document store settings
    pub store: StoreConfig,

    /// Schema sampling settings
    pub sampling: SamplingConfig,

    /// Relationship inference settings
    pub inference: InferenceConfig,

    /// Diagram output settings
    pub render: RenderConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SchemaGenError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SchemaGenError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        let timeouts = [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("store.timeout_secs", self.store.timeout_secs),
            ("render.timeout_secs", self.render.timeout_secs),
        ];
        for (key, value) in timeouts {
            if value == 0 {
                return Err(SchemaGenError::Config(format!(
                    "{} must be greater than 0",
                    key
                )));
            }
        }

        if self.sampling.limit == 0 {
            return Err(SchemaGenError::Config(
                "sampling.limit must be greater than 0".to_string(),
            ));
        }

        if self.inference.relationship_max_tokens == 0 || self.inference.format_max_tokens == 0 {
            return Err(SchemaGenError::Config(
                "inference token caps must be greater than 0".to_string(),
            ));
        }

        if self.render.prefix.trim().is_empty() {
            return Err(SchemaGenError::Config(
                "render.prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name. Unset means the provider's default (gpt-4o for OpenAI).
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    /// API key; falls back to OPENAI_API_KEY. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom endpoint (OpenAI-compatible server, remote Ollama)
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            api_key: None,
            api_base: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Cloud Firestore over its REST API
    #[default]
    Firestore,
    /// Directory of exported `<collection>.json` / `.jsonl` files
    Json,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Firestore => write!(f, "firestore"),
            StoreBackend::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "json" => Ok(StoreBackend::Json),
            _ => Err(format!(
                "Invalid store '{}'. Valid values: firestore, json",
                s
            )),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Google Cloud project; falls back to GOOGLE_CLOUD_PROJECT
    pub project_id: Option<String>,

    /// Firestore database id
    pub database: String,

    /// OAuth access token; falls back to GOOGLE_OAUTH_ACCESS_TOKEN.
    /// Never written back out.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    /// Firestore API base (e.g. an emulator at http://localhost:8080/v1)
    pub api_base: Option<String>,

    /// Export directory for the json backend
    pub path: Option<PathBuf>,

    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            project_id: None,
            database: store::DEFAULT_DATABASE.to_string(),
            access_token: None,
            api_base: None,
            path: None,
            timeout_secs: network::STORE_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base", &self.api_base)
            .field("path", &self.path)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// =============================================================================
// Sampling & Inference Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Documents inspected per collection
    pub limit: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            limit: sampling::DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Output cap for the relationship question
    pub relationship_max_tokens: usize,

    /// Output cap for the JSON reformatting request
    pub format_max_tokens: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            relationship_max_tokens: inference::RELATIONSHIP_MAX_TOKENS,
            format_max_tokens: inference::FORMAT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// Render Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub backend: RenderBackend,

    /// Image format requested from dot or the PlantUML server
    pub format: ImageFormat,

    /// Write an image in addition to printing the diagram text
    pub image: bool,

    /// Also save the diagram text as `.puml` / `.dot`
    pub save_source: bool,

    /// Directory for timestamped output files
    pub output_dir: PathBuf,

    /// Output filename prefix
    pub prefix: String,

    pub plantuml_server: String,

    /// Graphviz executable
    pub dot_binary: String,

    /// Timeout for one image render (seconds)
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::default(),
            format: ImageFormat::default(),
            image: true,
            save_source: false,
            output_dir: PathBuf::from("."),
            prefix: render::OUTPUT_PREFIX.to_string(),
            plantuml_server: render::PLANTUML_SERVER.to_string(),
            dot_binary: render::DOT_BINARY.to_string(),
            timeout_secs: network::STORE_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
