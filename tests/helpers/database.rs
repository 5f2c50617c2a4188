//! In-memory database setup for integration tests.

use sqlx::SqlitePool;

use collatz_explorer::adapters::sqlite::{create_test_pool, initialize_database};

/// Create a fresh in-memory database with the schema applied.
///
/// Each call yields a completely isolated store.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool().await.expect("failed to create test database");
    initialize_database(&pool).await.expect("failed to create schema");
    pool
}

/// Close the pool at the end of a test.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
