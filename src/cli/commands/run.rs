//! Implementation of the `collatz-explorer run` command: the long-running
//! computation engine process.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapters::sqlite::{
    create_pool, initialize_database, verify_connection, PoolConfig, SqliteSequenceStore,
};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::ComputationEngine;

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured database path
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct RunOutput {
    success: bool,
    resume_point: u64,
    next: u64,
    processed: u64,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        format!(
            "Processed {} starting number(s) ({}..{}); next run resumes at {}.",
            self.processed,
            self.resume_point,
            self.next.saturating_sub(1),
            self.next
        )
    }
}

/// Run the engine until SIGINT/SIGTERM requests the drain.
pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let database_path = args.database.as_deref().unwrap_or(&config.database.path);

    let pool_config = PoolConfig {
        max_connections: config.database.max_connections,
        ..PoolConfig::default()
    };
    let pool = create_pool(database_path, Some(pool_config))
        .await
        .with_context(|| format!("failed to open database at {database_path}"))?;
    verify_connection(&pool).await.context("database connection check failed")?;
    initialize_database(&pool).await.context("failed to create schema")?;

    let store = Arc::new(SqliteSequenceStore::with_retry(
        pool.clone(),
        config.engine.commit_retry,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_termination().await;
        info!("termination signal received, finishing the in-flight number");
        let _ = shutdown_tx.send(true);
    });

    let mut engine = ComputationEngine::new(store, config.engine.clone(), shutdown_rx);
    let report = engine.run().await.context("computation engine failed")?;
    pool.close().await;

    let result = RunOutput {
        success: true,
        resume_point: report.resume_point,
        next: report.next,
        processed: report.processed,
    };
    output(&result, json_mode);
    Ok(())
}

async fn wait_for_termination() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
