//! html-entry CLI - emit HTML entry points for compiled assets.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod assets;
mod commands;
mod config;
mod watcher;

#[derive(Parser)]
#[command(name = "html-entry")]
#[command(about = "Render an HTML entry point for every compiled asset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to html-entry.toml config file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file and starter template
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Render entry points once
    Build {
        /// Compiled assets directory (defaults to config or "dist")
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Rebuild when templates or assets change
    Watch {
        /// Compiled assets directory (defaults to config or "dist")
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build { assets, out } => {
            commands::build::run(&cli.config, assets, out).await?;
        }
        Commands::Watch { assets, out } => {
            commands::watch::run(&cli.config, assets, out).await?;
        }
    }

    Ok(())
}
