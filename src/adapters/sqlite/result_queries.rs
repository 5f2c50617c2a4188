//! SQLite implementation of the read-only query port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CollatzRecord, ComputationSummary, DistributionStat, RecentAverages};
use crate::domain::ports::ResultQueries;

use super::{format_timestamp, from_db_int, parse_timestamp, to_db_int};

/// Read-only adapter used by the query API and the stats command. Shares the
/// store with the engine process through SQLite's WAL reader semantics.
#[derive(Clone)]
pub struct SqliteResultQueries {
    pool: SqlitePool,
}

impl SqliteResultQueries {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CollatzRow {
    starting_number: i64,
    number_of_steps: i64,
    max_value: i64,
    sequence_length: i64,
    convergence: i64,
    timestamp: String,
}

impl TryFrom<CollatzRow> for CollatzRecord {
    type Error = DomainError;

    fn try_from(row: CollatzRow) -> DomainResult<Self> {
        Ok(CollatzRecord {
            starting_number: from_db_int(row.starting_number)?,
            number_of_steps: from_db_int(row.number_of_steps)?,
            max_value: from_db_int(row.max_value)?,
            sequence_length: row.sequence_length,
            convergence: row.convergence != 0,
            timestamp: parse_timestamp(&row.timestamp)?,
        })
    }
}

fn into_records(rows: Vec<CollatzRow>) -> DomainResult<Vec<CollatzRecord>> {
    rows.into_iter().map(CollatzRecord::try_from).collect()
}

#[async_trait]
impl ResultQueries for SqliteResultQueries {
    async fn find(&self, starting_number: u64) -> DomainResult<Option<CollatzRecord>> {
        let row: Option<CollatzRow> = sqlx::query_as("SELECT * FROM collatz WHERE starting_number = ?")
            .bind(to_db_int(starting_number)?)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CollatzRecord::try_from).transpose()
    }

    async fn range(&self, start: u64, end: u64) -> DomainResult<Vec<CollatzRecord>> {
        let rows: Vec<CollatzRow> = sqlx::query_as(
            "SELECT * FROM collatz WHERE starting_number BETWEEN ? AND ? ORDER BY starting_number",
        )
        .bind(to_db_int(start)?)
        .bind(to_db_int(end)?)
        .fetch_all(&self.pool)
        .await?;
        into_records(rows)
    }

    async fn top_by_steps(&self, limit: u32) -> DomainResult<Vec<CollatzRecord>> {
        let rows: Vec<CollatzRow> = sqlx::query_as(
            "SELECT * FROM collatz ORDER BY number_of_steps DESC, starting_number LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        into_records(rows)
    }

    async fn recent_averages(&self, count: u32) -> DomainResult<RecentAverages> {
        let (average_number_of_steps, average_max_value): (Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT AVG(number_of_steps), AVG(max_value) FROM
             (SELECT number_of_steps, max_value FROM collatz ORDER BY starting_number DESC LIMIT ?)",
        )
        .bind(i64::from(count))
        .fetch_one(&self.pool)
        .await?;
        Ok(RecentAverages { average_number_of_steps, average_max_value })
    }

    async fn search(&self, number_of_steps: u64, max_value: u64) -> DomainResult<Vec<CollatzRecord>> {
        let rows: Vec<CollatzRow> = sqlx::query_as(
            "SELECT * FROM collatz WHERE number_of_steps = ? AND max_value = ? ORDER BY starting_number",
        )
        .bind(to_db_int(number_of_steps)?)
        .bind(to_db_int(max_value)?)
        .fetch_all(&self.pool)
        .await?;
        into_records(rows)
    }

    async fn summary(&self) -> DomainResult<ComputationSummary> {
        let (last, first_ts, last_ts): (Option<i64>, Option<String>, Option<String>) =
            sqlx::query_as("SELECT MAX(starting_number), MIN(timestamp), MAX(timestamp) FROM collatz")
                .fetch_one(&self.pool)
                .await?;

        let Some(last) = last else {
            return Ok(ComputationSummary {
                last_checked_number: 0,
                total_computation_time: 0.0,
                average_steps: 0.0,
            });
        };

        let average_steps: Option<f64> = sqlx::query_scalar("SELECT AVG(number_of_steps) FROM collatz")
            .fetch_one(&self.pool)
            .await?;

        let total_computation_time = match (first_ts, last_ts) {
            (Some(first), Some(latest)) => {
                let span = parse_timestamp(&latest)? - parse_timestamp(&first)?;
                span.num_milliseconds() as f64 / 1_000.0
            }
            _ => 0.0,
        };

        Ok(ComputationSummary {
            last_checked_number: from_db_int(last)?,
            total_computation_time,
            average_steps: average_steps.unwrap_or(0.0),
        })
    }

    async fn count_since(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collatz WHERE timestamp >= ?")
            .bind(format_timestamp(cutoff))
            .fetch_one(&self.pool)
            .await?;
        from_db_int(count)
    }

    async fn distribution(&self) -> DomainResult<Vec<DistributionStat>> {
        let rows: Vec<(String, f64)> = sqlx::query_as("SELECT stat_name, value FROM distribution")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(stat_name, value)| DistributionStat { stat_name, value })
            .collect())
    }
}
