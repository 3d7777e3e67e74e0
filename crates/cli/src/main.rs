//! Coherence CLI
//!
//! Terminal front end of the coherence engine:
//! - `wave-validate`: score a file and fail below a threshold
//! - `sphinx`: run the five gates over a file
//! - `bump`: verify a handoff payload's declared digest
//! - `hash`: compute the digest to declare for a handoff
//! - `ops`: list the operations the engine dispatches

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use coherence_engine::{CoherenceEngine, EngineConfig};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{bump, sphinx, wave};

/// Coherence CLI application
#[derive(Parser)]
#[command(name = "coherence")]
#[command(about = "Coherence Validation Engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COHERENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of the ATOM trail (overrides config and COHERENCE_ATOM_DIR)
    #[arg(long)]
    atom_dir: Option<PathBuf>,

    /// Do not write decisions to the ATOM trail
    #[arg(long)]
    no_audit: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Score a file and exit non-zero when it falls below the threshold
    WaveValidate(wave::WaveArgs),

    /// Run the SPHINX gates over a file
    Sphinx(sphinx::SphinxArgs),

    /// Validate a bump payload (JSON file, `-` for stdin)
    Bump {
        payload: PathBuf,
    },

    /// Print the contextHash of a handoff (JSON file, `-` for stdin)
    Hash {
        handoff: PathBuf,
    },

    /// List dispatchable operations with their input schemas
    Ops,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.atom_dir {
        config.atom_trail_dir = dir.clone();
    }
    if cli.no_audit {
        config.audit_enabled = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "coherence=debug" } else { "coherence=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = load_config(&cli)?;
    debug!(?config, "Loaded configuration");
    let engine = CoherenceEngine::new(config)?;

    let passed = match cli.command {
        Commands::WaveValidate(args) => wave::execute(&engine, args, cli.json)?,
        Commands::Sphinx(args) => sphinx::execute(&engine, args, cli.json).await?,
        Commands::Bump { payload } => bump::validate(&engine, &payload, cli.json).await?,
        Commands::Hash { handoff } => bump::hash(&engine, &handoff, cli.json)?,
        Commands::Ops => {
            output::print_json(&CoherenceEngine::operations())?;
            true
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
