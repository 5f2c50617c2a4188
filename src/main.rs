//! Collatz explorer CLI entry point.

use clap::Parser;

use collatz_explorer::cli::{handle_error, Cli, Commands};
use collatz_explorer::infrastructure::{config::ConfigLoader, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(&err, cli.json),
    };

    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => {
            collatz_explorer::cli::commands::init::execute(args, &config, cli.json).await
        }
        Commands::Run(args) => {
            collatz_explorer::cli::commands::run::execute(args, &config, cli.json).await
        }
        Commands::Serve(args) => {
            collatz_explorer::cli::commands::serve::execute(args, &config).await
        }
        Commands::Stats(args) => {
            collatz_explorer::cli::commands::stats::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(&err, cli.json);
    }
}
