//! SQLite implementation of the engine's write-side store.

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use futures::stream::BoxStream;
use futures::StreamExt;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CollatzRecord, CommitRetryConfig, DistributionStat, StepCacheEntry};
use crate::domain::ports::SequenceStore;

use super::{format_timestamp, from_db_int, to_db_int};

/// Write-side store adapter. The engine process holds exactly one of these;
/// commits that hit transient SQLITE_BUSY contention from a concurrent
/// reader are retried with bounded exponential backoff.
#[derive(Clone)]
pub struct SqliteSequenceStore {
    pool: SqlitePool,
    retry: CommitRetryConfig,
}

impl SqliteSequenceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_retry(pool, CommitRetryConfig::default())
    }

    pub fn with_retry(pool: SqlitePool, retry: CommitRetryConfig) -> Self {
        Self { pool, retry }
    }

    fn retry_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.retry.initial_backoff_ms),
            max_interval: Duration::from_millis(self.retry.max_backoff_ms),
            max_elapsed_time: Some(Duration::from_millis(self.retry.max_elapsed_ms)),
            ..ExponentialBackoff::default()
        }
    }
}

/// Retry only contention; every other store failure is permanent.
fn classify(err: sqlx::Error) -> backoff::Error<sqlx::Error> {
    if is_busy(&err) {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("5" | "6" | "261" | "517"))
                || db.message().contains("database is locked")
        }
        _ => false,
    }
}

fn map_insert_error(err: sqlx::Error, starting_number: u64) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation => {
            DomainError::DuplicateResult(starting_number)
        }
        _ => DomainError::from(err),
    }
}

#[async_trait]
impl SequenceStore for SqliteSequenceStore {
    async fn cached_steps(&self, number: u64) -> DomainResult<Option<u64>> {
        let row: Option<i64> = sqlx::query_scalar("SELECT steps FROM sequence_length WHERE number = ?")
            .bind(to_db_int(number)?)
            .fetch_optional(&self.pool)
            .await?;
        row.map(from_db_int).transpose()
    }

    async fn put_cached_steps(&self, number: u64, steps: u64) -> DomainResult<()> {
        let number = to_db_int(number)?;
        let steps = to_db_int(steps)?;
        backoff::future::retry(self.retry_policy(), || async {
            sqlx::query("INSERT OR REPLACE INTO sequence_length (number, steps) VALUES (?, ?)")
                .bind(number)
                .bind(steps)
                .execute(&self.pool)
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
        .map_err(DomainError::from)
    }

    async fn convergence_of(&self, number: u64) -> DomainResult<Option<bool>> {
        let row: Option<i64> = sqlx::query_scalar("SELECT converges FROM convergence WHERE number = ?")
            .bind(to_db_int(number)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|v| v != 0))
    }

    async fn put_convergence(&self, number: u64, converges: bool) -> DomainResult<()> {
        let number = to_db_int(number)?;
        backoff::future::retry(self.retry_policy(), || async {
            sqlx::query("INSERT OR REPLACE INTO convergence (number, converges) VALUES (?, ?)")
                .bind(number)
                .bind(i64::from(converges))
                .execute(&self.pool)
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
        .map_err(DomainError::from)
    }

    async fn record_walk(
        &self,
        entries: &[StepCacheEntry],
        origin: u64,
        converges: bool,
    ) -> DomainResult<()> {
        let rows: Vec<(i64, i64)> = entries
            .iter()
            .map(|entry| Ok((to_db_int(entry.number)?, to_db_int(entry.steps)?)))
            .collect::<DomainResult<_>>()?;
        let origin = to_db_int(origin)?;

        backoff::future::retry(self.retry_policy(), || async {
            let mut tx = self.pool.begin().await.map_err(classify)?;
            for (number, steps) in &rows {
                sqlx::query("INSERT OR REPLACE INTO sequence_length (number, steps) VALUES (?, ?)")
                    .bind(number)
                    .bind(steps)
                    .execute(&mut *tx)
                    .await
                    .map_err(classify)?;
            }
            sqlx::query("INSERT OR REPLACE INTO convergence (number, converges) VALUES (?, ?)")
                .bind(origin)
                .bind(i64::from(converges))
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
            tx.commit().await.map_err(classify)?;
            Ok(())
        })
        .await
        .map_err(DomainError::from)
    }

    async fn append_result(&self, record: &CollatzRecord) -> DomainResult<()> {
        let starting_number = to_db_int(record.starting_number)?;
        let number_of_steps = to_db_int(record.number_of_steps)?;
        let max_value = to_db_int(record.max_value)?;
        let timestamp = format_timestamp(record.timestamp);

        backoff::future::retry(self.retry_policy(), || async {
            sqlx::query(
                r"INSERT INTO collatz
                  (starting_number, number_of_steps, max_value, sequence_length, convergence, timestamp)
                  VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(starting_number)
            .bind(number_of_steps)
            .bind(max_value)
            .bind(record.sequence_length)
            .bind(i64::from(record.convergence))
            .bind(&timestamp)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
            Ok(())
        })
        .await
        .map_err(|err| map_insert_error(err, record.starting_number))
    }

    async fn max_starting_number(&self) -> DomainResult<Option<u64>> {
        let row: Option<i64> = sqlx::query_scalar("SELECT MAX(starting_number) FROM collatz")
            .fetch_one(&self.pool)
            .await?;
        row.map(from_db_int).transpose()
    }

    fn all_max_values(&self) -> BoxStream<'_, DomainResult<u64>> {
        sqlx::query_scalar::<_, i64>("SELECT max_value FROM collatz ORDER BY starting_number")
            .fetch(&self.pool)
            .map(|row| row.map_err(DomainError::from).and_then(from_db_int))
            .boxed()
    }

    async fn append_distribution(&self, stats: &[DistributionStat]) -> DomainResult<()> {
        backoff::future::retry(self.retry_policy(), || async {
            let mut tx = self.pool.begin().await.map_err(classify)?;
            for stat in stats {
                sqlx::query("INSERT INTO distribution (stat_name, value) VALUES (?, ?)")
                    .bind(&stat.stat_name)
                    .bind(stat.value)
                    .execute(&mut *tx)
                    .await
                    .map_err(classify)?;
            }
            tx.commit().await.map_err(classify)?;
            Ok(())
        })
        .await
        .map_err(DomainError::from)
    }
}
