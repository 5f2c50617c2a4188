mod helpers;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::watch;

use collatz_explorer::adapters::sqlite::SqliteSequenceStore;
use collatz_explorer::domain::errors::{DomainError, DomainResult};
use collatz_explorer::domain::models::{CollatzRecord, DistributionStat, EngineConfig, StepCacheEntry};
use collatz_explorer::domain::ports::SequenceStore;
use collatz_explorer::{ComputationEngine, ProgressTracker, SequenceComputer};

use helpers::database::{setup_test_db, teardown_test_db};

#[tokio::test]
async fn resume_point_is_one_on_an_empty_store() {
    let pool = setup_test_db().await;
    let store: Arc<dyn SequenceStore> = Arc::new(SqliteSequenceStore::new(pool.clone()));

    let tracker = ProgressTracker::new(store);
    assert_eq!(tracker.resume_point().await.unwrap(), 1);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn resume_point_is_highest_committed_plus_one() {
    let pool = setup_test_db().await;
    let store: Arc<dyn SequenceStore> = Arc::new(SqliteSequenceStore::new(pool.clone()));

    let record = CollatzRecord {
        starting_number: 41,
        number_of_steps: 107,
        max_value: 9232,
        sequence_length: 106,
        convergence: false,
        timestamp: Utc::now(),
    };
    store.append_result(&record).await.unwrap();

    let tracker = ProgressTracker::new(store);
    assert_eq!(tracker.resume_point().await.unwrap(), 42);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn pre_signaled_engine_drains_without_processing() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let mut engine = ComputationEngine::new(store, EngineConfig::default(), shutdown_rx);
    let report = engine.run().await.unwrap();

    assert_eq!(report.resume_point, 1);
    assert_eq!(report.processed, 0);

    // The drain still aggregates: five zero-valued statistics on an empty store.
    let rows: Vec<(String, f64)> = sqlx::query_as("SELECT stat_name, value FROM distribution")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|(_, value)| *value == 0.0));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn engine_processes_until_signaled_then_aggregates() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut engine = ComputationEngine::new(store, EngineConfig::default(), shutdown_rx);

    let handle = tokio::spawn(async move { engine.run().await });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let report = handle.await.unwrap().unwrap();
    assert!(report.processed >= 1);
    assert_eq!(report.next, report.resume_point + report.processed);

    // Every frontier number up to the report is committed, gap-free.
    let committed: Vec<i64> =
        sqlx::query_scalar("SELECT starting_number FROM collatz ORDER BY starting_number")
            .fetch_all(&pool)
            .await
            .unwrap();
    let expected: Vec<i64> = (1..report.next as i64).collect();
    assert_eq!(committed, expected);

    // One distribution generation was appended.
    let stat_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM distribution")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stat_rows, 5);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn second_run_resumes_after_the_first() {
    let pool = setup_test_db().await;

    let first_next = {
        let store = Arc::new(SqliteSequenceStore::new(pool.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut engine = ComputationEngine::new(store, EngineConfig::default(), shutdown_rx);
        let handle = tokio::spawn(async move { engine.run().await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap().next
    };

    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();
    let mut engine = ComputationEngine::new(store, EngineConfig::default(), shutdown_rx);
    let report = engine.run().await.unwrap();

    assert_eq!(report.resume_point, first_next);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn stale_cache_rows_from_an_interrupted_run_are_harmless() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));

    // Simulate a crash between the walk commit and the result append: the
    // walk for 3 is in the cache but no result row was committed.
    let computer = SequenceComputer::new(store.clone());
    computer.compute(3).await.unwrap();

    let tracker = ProgressTracker::new(store.clone());
    assert_eq!(tracker.resume_point().await.unwrap(), 1);

    // Resumption recomputes 3 transparently through the leftover entries.
    let trajectory = computer.compute(3).await.unwrap();
    assert_eq!(trajectory.steps, 5);
    assert!(!trajectory.converges);

    teardown_test_db(pool).await;
}

/// Store wrapper whose result appends always fail, for exercising the
/// fatal-error path.
struct FailingAppendStore {
    inner: Arc<dyn SequenceStore>,
}

#[async_trait]
impl SequenceStore for FailingAppendStore {
    async fn cached_steps(&self, number: u64) -> DomainResult<Option<u64>> {
        self.inner.cached_steps(number).await
    }

    async fn put_cached_steps(&self, number: u64, steps: u64) -> DomainResult<()> {
        self.inner.put_cached_steps(number, steps).await
    }

    async fn convergence_of(&self, number: u64) -> DomainResult<Option<bool>> {
        self.inner.convergence_of(number).await
    }

    async fn put_convergence(&self, number: u64, converges: bool) -> DomainResult<()> {
        self.inner.put_convergence(number, converges).await
    }

    async fn record_walk(
        &self,
        entries: &[StepCacheEntry],
        origin: u64,
        converges: bool,
    ) -> DomainResult<()> {
        self.inner.record_walk(entries, origin, converges).await
    }

    async fn append_result(&self, _record: &CollatzRecord) -> DomainResult<()> {
        Err(DomainError::DatabaseError("append rejected".to_string()))
    }

    async fn max_starting_number(&self) -> DomainResult<Option<u64>> {
        self.inner.max_starting_number().await
    }

    fn all_max_values(&self) -> BoxStream<'_, DomainResult<u64>> {
        self.inner.all_max_values()
    }

    async fn append_distribution(&self, stats: &[DistributionStat]) -> DomainResult<()> {
        self.inner.append_distribution(stats).await
    }
}

#[tokio::test]
async fn fatal_error_aborts_without_aggregation() {
    let pool = setup_test_db().await;
    let failing = Arc::new(FailingAppendStore {
        inner: Arc::new(SqliteSequenceStore::new(pool.clone())),
    });

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut engine = ComputationEngine::new(failing, EngineConfig::default(), shutdown_rx);

    let result = engine.run().await;
    assert!(matches!(result, Err(DomainError::DatabaseError(_))));

    // The abort path never aggregates.
    let stat_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM distribution")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stat_rows, 0);

    teardown_test_db(pool).await;
}
