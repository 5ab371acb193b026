mod commands;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "In-process metrics aggregation: validate scopes, replay observations, inspect batches", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scope file
    Validate {
        /// Path to scope file (YAML, TOML, or JSON)
        scope_file: PathBuf,
    },

    /// List available publishers
    List,

    /// Replay recorded observations through a scope and flush once
    Replay {
        /// Path to scope file (YAML, TOML, or JSON)
        scope_file: PathBuf,

        /// JSON-lines file with one observation per line
        observations: PathBuf,
    },

    /// Render batches written by the json_lines publisher
    Report {
        /// Path to published JSON-lines file
        published_file: PathBuf,

        /// Output format (cli, json, markdown)
        #[arg(short, long, default_value = "cli")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Validate { scope_file } => {
            commands::validate::execute(scope_file).await?;
        }

        Commands::List => {
            commands::list::execute().await?;
        }

        Commands::Replay {
            scope_file,
            observations,
        } => {
            commands::replay::execute(scope_file, observations).await?;
        }

        Commands::Report {
            published_file,
            format,
            output,
        } => {
            commands::report::execute(published_file, format, output).await?;
        }
    }

    Ok(())
}
