//! Write-side port used by the computation engine.

use crate::domain::errors::DomainResult;
use crate::domain::models::{CollatzRecord, DistributionStat, StepCacheEntry};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Durable store for trajectory results, the step cache and convergence flags.
///
/// The engine is the sole writer. Every write commits a short-lived
/// transaction before returning; transient SQLITE_BUSY contention is retried
/// inside the adapter rather than surfaced to the caller.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Known remaining steps from `number` to its walk's stopping point.
    async fn cached_steps(&self, number: u64) -> DomainResult<Option<u64>>;

    /// Insert or overwrite a single step-cache entry.
    async fn put_cached_steps(&self, number: u64, steps: u64) -> DomainResult<()>;

    /// Recorded convergence flag for a previously processed starting number.
    async fn convergence_of(&self, number: u64) -> DomainResult<Option<bool>>;

    /// Insert or overwrite the convergence flag for a starting number.
    async fn put_convergence(&self, number: u64, converges: bool) -> DomainResult<()>;

    /// Commit one walk's cache backfill plus its convergence flag as a single
    /// transaction, so a concurrent reader never observes a partial backfill.
    async fn record_walk(
        &self,
        entries: &[StepCacheEntry],
        origin: u64,
        converges: bool,
    ) -> DomainResult<()>;

    /// Append one result row. Insert-only; a duplicate starting number is an error.
    async fn append_result(&self, record: &CollatzRecord) -> DomainResult<()>;

    /// Highest committed starting number, `None` on an empty store.
    async fn max_starting_number(&self) -> DomainResult<Option<u64>>;

    /// Every committed `max_value`, streamed in starting-number order.
    fn all_max_values(&self) -> BoxStream<'_, DomainResult<u64>>;

    /// Append one distribution snapshot row per statistic.
    async fn append_distribution(&self, stats: &[DistributionStat]) -> DomainResult<()>;
}
