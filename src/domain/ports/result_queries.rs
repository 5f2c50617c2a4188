//! Read-side port backing the query API and the stats command.

use crate::domain::errors::DomainResult;
use crate::domain::models::{CollatzRecord, ComputationSummary, DistributionStat, RecentAverages};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only queries over the accumulated results. Never writes.
#[async_trait]
pub trait ResultQueries: Send + Sync {
    /// Single record lookup by starting number.
    async fn find(&self, starting_number: u64) -> DomainResult<Option<CollatzRecord>>;

    /// Records whose starting number lies in `[start, end]`, ascending.
    async fn range(&self, start: u64, end: u64) -> DomainResult<Vec<CollatzRecord>>;

    /// The `limit` records with the highest step counts.
    async fn top_by_steps(&self, limit: u32) -> DomainResult<Vec<CollatzRecord>>;

    /// Average steps and max value over the most recent `count` records.
    async fn recent_averages(&self, count: u32) -> DomainResult<RecentAverages>;

    /// Records matching an exact (steps, max value) pair.
    async fn search(&self, number_of_steps: u64, max_value: u64) -> DomainResult<Vec<CollatzRecord>>;

    /// Whole-store summary: last number, wall-clock span, average steps.
    async fn summary(&self) -> DomainResult<ComputationSummary>;

    /// Count of rows committed at or after `cutoff`.
    async fn count_since(&self, cutoff: DateTime<Utc>) -> DomainResult<u64>;

    /// All persisted distribution snapshot rows, in insertion order.
    async fn distribution(&self) -> DomainResult<Vec<DistributionStat>>;
}
