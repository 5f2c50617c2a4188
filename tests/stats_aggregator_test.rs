mod helpers;

use chrono::Utc;
use std::sync::Arc;

use collatz_explorer::adapters::sqlite::{SqliteResultQueries, SqliteSequenceStore};
use collatz_explorer::domain::models::CollatzRecord;
use collatz_explorer::domain::ports::{ResultQueries, SequenceStore};
use collatz_explorer::StatsAggregator;

use helpers::database::{setup_test_db, teardown_test_db};

async fn seed_max_values(store: &SqliteSequenceStore, max_values: &[u64]) {
    for (i, &max_value) in max_values.iter().enumerate() {
        let starting_number = i as u64 + 1;
        let record = CollatzRecord {
            starting_number,
            number_of_steps: 1,
            max_value,
            sequence_length: 0,
            convergence: false,
            timestamp: Utc::now(),
        };
        store.append_result(&record).await.unwrap();
    }
}

fn value_of(stats: &[(String, f64)], name: &str) -> f64 {
    stats.iter().find(|(n, _)| n == name).map(|(_, v)| *v).unwrap()
}

#[tokio::test]
async fn aggregates_the_known_fixture() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));
    seed_max_values(&store, &[1, 4, 2, 4, 16]).await;

    StatsAggregator::new(store).compute_and_persist().await.unwrap();

    let rows: Vec<(String, f64)> = sqlx::query_as("SELECT stat_name, value FROM distribution")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(value_of(&rows, "min"), 1.0);
    assert_eq!(value_of(&rows, "max"), 16.0);
    assert!((value_of(&rows, "mean") - 5.4).abs() < 1e-9);
    assert_eq!(value_of(&rows, "median"), 4.0);
    assert!((value_of(&rows, "std_dev") - 29.44_f64.sqrt()).abs() < 1e-9);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn zero_observations_record_all_zero_statistics() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));

    let stats = StatsAggregator::new(store).compute_and_persist().await.unwrap();

    assert_eq!(stats.len(), 5);
    assert!(stats.iter().all(|s| s.value == 0.0));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn snapshot_generations_accumulate() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteSequenceStore::new(pool.clone()));
    seed_max_values(&store, &[3, 9]).await;

    // The aggregator runs once per process lifetime; a second process
    // appends a second generation rather than replacing the first.
    let aggregator_store: Arc<dyn SequenceStore> = Arc::clone(&store);
    let aggregator = StatsAggregator::new(aggregator_store);
    aggregator.compute_and_persist().await.unwrap();
    aggregator.compute_and_persist().await.unwrap();

    let queries = SqliteResultQueries::new(pool.clone());
    let rows = queries.distribution().await.unwrap();
    assert_eq!(rows.len(), 10);

    teardown_test_db(pool).await;
}
