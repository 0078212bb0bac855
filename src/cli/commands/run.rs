//! Run Command
//!
//! Full pipeline: sample the store, infer relationships, render a diagram.
//!
//! Usage:
//!   schemagen run [--provider P] [--model M] [--store firestore|json] [--data DIR]
//!                 [--project ID] [--backend uml|graph] [--output PATH] [--no-image]
//!                 [--save-source] [--limit N]

use std::path::PathBuf;
use tracing::info;

use crate::ai::{ProviderConfig, create_provider};
use crate::cli::ui::Output;
use crate::cli::util::{RenderOverrides, StoreOverrides, load_config, runtime};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::store::create_store;
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub limit: Option<usize>,
    pub store: StoreOverrides,
    pub render: RenderOverrides,
}

pub fn run(options: RunOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;

    if let Some(provider) = options.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = options.model {
        config.llm.model = Some(model);
    }
    if let Some(limit) = options.limit {
        config.sampling.limit = limit;
    }
    options.store.apply(&mut config.store);
    config.validate()?;

    let store = create_store(&config.store)?;
    let provider = create_provider(&ProviderConfig::from(&config.llm))?;
    info!(
        "Using store {} and LLM provider {} ({})",
        store.name(),
        provider.name(),
        provider.model()
    );

    let mut pipeline_options = PipelineOptions::from(&config);
    options.render.apply(&mut pipeline_options);

    let rt = runtime()?;
    let report = rt.block_on(Pipeline::new(store, provider, pipeline_options).run())?;

    let output = Output::new();
    output.success(&format!(
        "{} collections, {} relationships ({} tokens)",
        report.schema.len(),
        report.relationships.total(),
        report.usage.total()
    ));
    if let Some(image) = &report.diagram.image {
        output.info(&format!("Diagram: {}", image.path.display()));
    }
    if let Some(path) = &report.diagram.source_path {
        output.info(&format!("Source: {}", path.display()));
    }
    Ok(())
}
