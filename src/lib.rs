//! schemagen - Schema & Relationship Diagrams for Document Databases
//!
//! Samples a document database's collections to infer which fields each
//! collection has, asks a language model which fields reference other
//! collections, and renders the result as a Graphviz graph or a PlantUML
//! class diagram.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schemagen::{ConfigLoader, Pipeline, PipelineOptions};
//! use schemagen::ai::{ProviderConfig, create_provider};
//! use schemagen::store::create_store;
//!
//! let config = ConfigLoader::load()?;
//! let store = create_store(&config.store)?;
//! let provider = create_provider(&ProviderConfig::from(&config.llm))?;
//! let report = Pipeline::new(store, provider, PipelineOptions::from(&config))
//!     .run()
//!     .await?;
//! println!("{}", report.diagram.source);
//! ```
//!
//! ## Modules
//!
//! - [`store`]: document store trait with Firestore, JSON export and in-memory backends
//! - [`schema`]: schema model and the bounded field sampler
//! - [`ai`]: LLM provider abstraction (OpenAI, Ollama)
//! - [`inference`]: two-stage relationship inference and fenced-JSON parsing
//! - [`render`]: Graphviz and PlantUML renderers
//! - [`pipeline`]: sample → infer → render orchestration
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod inference;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod store;
pub mod timeout;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, LlmError, ParseErrorKind, Result, SchemaGenError};

pub use ai::{LlmProvider, LlmResponse, SharedProvider};
pub use inference::RelationshipInferrer;
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use render::{DiagramArtifact, DiagramRenderer, RenderBackend};
pub use schema::{CollectionShape, FieldList, Relationship, RelationshipSet, Schema, SchemaSampler};
pub use store::{Document, DocumentStore, SharedStore};
pub use timeout::with_timeout;
