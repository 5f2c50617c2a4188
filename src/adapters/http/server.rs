//! Router assembly and server lifecycle for the query API.

use anyhow::{Context, Result};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{info, warn};

use super::handlers::{
    get_average, get_range, get_record, get_top, refresh_block_list, search, stats_distribution,
    stats_hourly, stats_summary, ApiContext,
};

/// Assemble the query API router with the blocklist layer applied.
pub fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/collatz/:num", get(get_record))
        .route("/collatz/range/:start/:end", get(get_range))
        .route("/collatz/top/:n", get(get_top))
        .route("/collatz/average/:n", get(get_average))
        .route("/collatz/search/:number_of_steps/:max_value", get(search))
        .route("/stats", get(stats_summary))
        .route("/stats/hourly", get(stats_hourly))
        .route("/stats/distribution", get(stats_distribution))
        .route("/refresh_block_list/:password", post(refresh_block_list))
        .layer(middleware::from_fn_with_state(ctx.clone(), enforce_blocklist))
        .with_state(ctx)
}

/// Reject requests from blocklisted client addresses before routing.
async fn enforce_blocklist(
    State(ctx): State<ApiContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = addr.ip();
    info!(client_ip = %ip, "request received");
    if ctx.blocklist.contains(ip).await {
        warn!(client_ip = %ip, "blocked a request");
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied." }))).into_response();
    }
    next.run(request).await
}

/// Serve the query API until a termination signal arrives.
pub async fn serve(addr: SocketAddr, ctx: ApiContext) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "query API listening");

    axum::serve(listener, build_router(ctx).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("query API server failed")
}

async fn shutdown_signal() {
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
    info!("termination signal received, shutting down query API");
}
