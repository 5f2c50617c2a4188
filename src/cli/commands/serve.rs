//! Implementation of the `collatz-explorer serve` command: the read-only
//! query API process.

use anyhow::{Context, Result};
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::adapters::http::{serve, ApiContext, Blocklist};
use crate::adapters::sqlite::{create_pool, initialize_database, SqliteResultQueries};
use crate::domain::models::Config;

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured bind port
    #[arg(long)]
    pub port: Option<u16>,
}

/// Serve the query API until a termination signal arrives.
pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let pool = create_pool(&config.database.path, None)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;
    // The schema may not exist yet when the API starts before the engine.
    initialize_database(&pool).await.context("failed to create schema")?;

    let ctx = ApiContext {
        queries: Arc::new(SqliteResultQueries::new(pool.clone())),
        blocklist: Arc::new(Blocklist::load(config.server.blocklist_path.as_str()).await),
        admin_password: config.server.admin_password.clone(),
    };

    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", config.server.host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, port))?;

    let result = serve(addr, ctx).await;
    pool.close().await;
    result
}
