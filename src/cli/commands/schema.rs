//! Schema Command
//!
//! Sample the store and print the inferred schema as JSON. No model calls.
//!
//! Usage:
//!   schemagen schema [--store firestore|json] [--data DIR] [--project ID] [--limit N]

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{StoreOverrides, load_config, runtime};
use crate::schema::SchemaSampler;
use crate::store::create_store;
use crate::types::Result;

pub fn run(
    config_path: Option<PathBuf>,
    store_overrides: StoreOverrides,
    limit: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    store_overrides.apply(&mut config.store);
    if let Some(limit) = limit {
        config.sampling.limit = limit;
    }
    config.validate()?;

    let store = create_store(&config.store)?;
    let sampler = SchemaSampler::new(config.sampling.limit);

    let rt = runtime()?;
    let schema = rt.block_on(sampler.sample(store.as_ref()))?;

    println!("{}", schema.to_pretty_json()?);
    Output::new().success(&format!(
        "Sampled {} collections from {}",
        schema.len(),
        store.name()
    ));
    Ok(())
}
