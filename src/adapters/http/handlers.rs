//! Query API handlers. Every route is a read-only SELECT over the store;
//! the engine process remains the sole writer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::http::Blocklist;
use crate::domain::errors::DomainError;
use crate::domain::models::{CollatzRecord, ComputationSummary, DistributionStat, RecentAverages};
use crate::domain::ports::ResultQueries;

/// Shared state for the query API.
#[derive(Clone)]
pub struct ApiContext {
    /// Read-only store access.
    pub queries: Arc<dyn ResultQueries>,
    /// Blocked client addresses.
    pub blocklist: Arc<Blocklist>,
    /// Password gating the blocklist refresh; refresh is rejected when unset.
    pub admin_password: Option<String>,
}

/// Errors rendered as JSON responses.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Forbidden(String),
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, detail),
            ApiError::Internal(detail) => {
                warn!(detail, "query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// GET /collatz/:num
pub async fn get_record(
    State(ctx): State<ApiContext>,
    Path(num): Path<u64>,
) -> Result<Json<CollatzRecord>, ApiError> {
    match ctx.queries.find(num).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound("No data found for this number.".to_string())),
    }
}

/// GET /collatz/range/:start/:end
pub async fn get_range(
    State(ctx): State<ApiContext>,
    Path((start, end)): Path<(u64, u64)>,
) -> Result<Json<Vec<CollatzRecord>>, ApiError> {
    Ok(Json(ctx.queries.range(start, end).await?))
}

/// GET /collatz/top/:n
pub async fn get_top(
    State(ctx): State<ApiContext>,
    Path(n): Path<u32>,
) -> Result<Json<Vec<CollatzRecord>>, ApiError> {
    Ok(Json(ctx.queries.top_by_steps(n).await?))
}

/// GET /collatz/average/:n
pub async fn get_average(
    State(ctx): State<ApiContext>,
    Path(n): Path<u32>,
) -> Result<Json<RecentAverages>, ApiError> {
    Ok(Json(ctx.queries.recent_averages(n).await?))
}

/// GET /collatz/search/:number_of_steps/:max_value
pub async fn search(
    State(ctx): State<ApiContext>,
    Path((number_of_steps, max_value)): Path<(u64, u64)>,
) -> Result<Json<Vec<CollatzRecord>>, ApiError> {
    Ok(Json(ctx.queries.search(number_of_steps, max_value).await?))
}

/// GET /stats
pub async fn stats_summary(
    State(ctx): State<ApiContext>,
) -> Result<Json<ComputationSummary>, ApiError> {
    Ok(Json(ctx.queries.summary().await?))
}

/// Trailing-hour commit count.
#[derive(Debug, Serialize)]
pub struct HourlyCount {
    /// Rows committed within the last hour.
    pub collatz_count_last_hour: u64,
}

/// GET /stats/hourly
pub async fn stats_hourly(State(ctx): State<ApiContext>) -> Result<Json<HourlyCount>, ApiError> {
    let cutoff = Utc::now() - Duration::hours(1);
    let count = ctx.queries.count_since(cutoff).await?;
    Ok(Json(HourlyCount { collatz_count_last_hour: count }))
}

/// GET /stats/distribution
pub async fn stats_distribution(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<DistributionStat>>, ApiError> {
    Ok(Json(ctx.queries.distribution().await?))
}

/// POST /refresh_block_list/:password
pub async fn refresh_block_list(
    State(ctx): State<ApiContext>,
    Path(password): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let authorized = ctx.admin_password.as_deref().is_some_and(|expected| expected == password);
    if !authorized {
        return Err(ApiError::Forbidden("Incorrect password.".to_string()));
    }

    let count = ctx
        .blocklist
        .reload()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    info!(blocked = count, "IP block list has been updated");
    Ok(Json(json!({ "message": "Block list successfully updated" })))
}
