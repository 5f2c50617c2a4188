//! Implementation of the `collatz-explorer init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{create_pool, initialize_database, verify_connection};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::DEFAULT_CONFIG_FILE;

/// Arguments for `init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
struct InitOutput {
    success: bool,
    message: String,
    config_file: Option<PathBuf>,
    database_path: String,
    migrations_applied: usize,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if let Some(path) = &self.config_file {
            lines.push(format!("Configuration written to {}", path.display()));
        }
        lines.push(format!(
            "Database ready at {} ({} migration(s) applied)",
            self.database_path, self.migrations_applied
        ));
        lines.join("\n")
    }
}

/// Write the default configuration (unless present) and create the store
/// schema. Both steps are idempotent.
pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    let config_file = if config_path.exists() && !args.force {
        None
    } else {
        let rendered = serde_yaml::to_string(&Config::default())
            .context("failed to render default configuration")?;
        fs::write(&config_path, rendered)
            .await
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        Some(config_path)
    };

    let pool = create_pool(&config.database.path, None)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;
    verify_connection(&pool).await.context("database connection check failed")?;
    let migrations_applied = initialize_database(&pool).await.context("failed to create schema")?;
    pool.close().await;

    let result = InitOutput {
        success: true,
        message: "Collatz explorer initialized.".to_string(),
        config_file,
        database_path: config.database.path.clone(),
        migrations_applied,
    };
    output(&result, json_mode);
    Ok(())
}
