//! Command-line interface for the Collatz explorer.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::{output, CommandOutput};

/// Top-level CLI definition.
#[derive(Parser)]
#[command(name = "collatz-explorer")]
#[command(about = "Collatz conjecture exploration engine and query API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Path to a configuration file (defaults to collatz.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the store schema and write a default configuration file
    Init(commands::init::InitArgs),

    /// Run the computation engine until a termination signal arrives
    Run(commands::run::RunArgs),

    /// Serve the read-only query API
    Serve(commands::serve::ServeArgs),

    /// Show computation statistics from the store
    Stats(commands::stats::StatsArgs),
}

/// Render a command failure and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let value = serde_json::json!({ "success": false, "error": format!("{err:#}") });
        eprintln!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        eprintln!("{}", console::style(format!("Error: {err:#}")).red());
    }
    std::process::exit(1);
}
