mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, tracked::TrackedSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "herald",
    about = "Announce cards that reach a board's done list, once per card",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .herald/)
    #[arg(long, global = true, env = "HERALD_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.herald/config.yaml)
    #[arg(long, global = true, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one check cycle: announce every new card in the watched list
    Check {
        /// Show what would be announced without posting or tracking anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect or correct the set of already-announced cards
    Tracked {
        #[command(subcommand)]
        subcommand: TrackedSubcommand,
    },

    /// Validate or display the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Check { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let config_path = cli
        .config
        .unwrap_or_else(|| herald_core::paths::config_path(&root));

    let result = match cli.command {
        Commands::Check { dry_run } => cmd::check::run(&root, &config_path, dry_run, cli.json),
        Commands::Tracked { subcommand } => {
            cmd::tracked::run(&root, &config_path, subcommand, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&config_path, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
