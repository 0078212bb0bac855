use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schemagen::cli::{RenderOverrides, StoreOverrides, commands};
use schemagen::config::StoreBackend;
use schemagen::render::{ImageFormat, RenderBackend};

fn parse_store(s: &str) -> Result<StoreBackend, String> {
    s.parse()
}

fn parse_backend(s: &str) -> Result<RenderBackend, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<ImageFormat, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "schemagen")]
#[command(
    version,
    about = "Infer document-database schemas and their relationships, rendered as diagrams"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        short,
        global = true,
        help = "Config file to use instead of the global/project chain"
    )]
    config: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, short, global = true, help = "Only log errors")]
    quiet: bool,
}

#[derive(clap::Args)]
struct StoreArgs {
    #[arg(long, value_parser = parse_store, help = "Document store: firestore, json")]
    store: Option<StoreBackend>,

    #[arg(long, help = "Directory of exported <collection>.json/.jsonl files")]
    data: Option<PathBuf>,

    #[arg(long, env = "GOOGLE_CLOUD_PROJECT", help = "Firestore project id")]
    project: Option<String>,
}

impl From<StoreArgs> for StoreOverrides {
    fn from(args: StoreArgs) -> Self {
        Self {
            backend: args.store,
            data: args.data,
            project: args.project,
        }
    }
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(long, short, value_parser = parse_backend, help = "Diagram backend: uml, graph")]
    backend: Option<RenderBackend>,

    #[arg(long, value_parser = parse_format, help = "Image format: png, svg")]
    format: Option<ImageFormat>,

    #[arg(long, short, help = "Image path (default: schema_<timestamp>.<ext>)")]
    output: Option<PathBuf>,

    #[arg(long, help = "Print the diagram text only")]
    no_image: bool,

    #[arg(long, help = "Also save the diagram text as .puml / .dot")]
    save_source: bool,
}

impl From<RenderArgs> for RenderOverrides {
    fn from(args: RenderArgs) -> Self {
        Self {
            backend: args.backend,
            format: args.format,
            output: args.output,
            no_image: args.no_image,
            save_source: args.save_source,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sample, infer relationships and render a diagram
    Run {
        #[arg(long, short, help = "LLM provider: openai, ollama")]
        provider: Option<String>,

        #[arg(long, short, help = "Model name (default: provider's default)")]
        model: Option<String>,

        #[arg(long, short, help = "Documents sampled per collection")]
        limit: Option<usize>,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Sample the store and print the schema as JSON
    Schema {
        #[arg(long, short, help = "Documents sampled per collection")]
        limit: Option<usize>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Render a diagram from schema / relationship JSON files
    Render {
        #[arg(long, short, help = "Schema JSON: {\"collection\": [\"field\", ...]}")]
        schema: PathBuf,

        #[arg(
            long,
            short,
            help = "Relationships JSON: {\"collection\": [[\"field\", \"target\"], ...]}"
        )]
        relationships: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mschemagen encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            provider,
            model,
            limit,
            store,
            render,
        } => {
            commands::run::run(commands::run::RunOptions {
                config: cli.config,
                provider,
                model,
                limit,
                store: store.into(),
                render: render.into(),
            })?;
        }
        Commands::Schema { limit, store } => {
            commands::schema::run(cli.config, store.into(), limit)?;
        }
        Commands::Render {
            schema,
            relationships,
            render,
        } => {
            commands::render::run(cli.config, schema, relationships, render.into())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(cli.config, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
