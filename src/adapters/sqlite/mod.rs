//! SQLite adapters for the Collatz exploration store.

pub mod connection;
pub mod migrations;
pub mod result_queries;
pub mod sequence_store;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use result_queries::SqliteResultQueries;
pub use sequence_store::SqliteSequenceStore;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Ensure the four store tables exist. Idempotent; safe on every startup.
pub async fn initialize_database(pool: &SqlitePool) -> Result<usize, MigrationError> {
    Migrator::new(pool.clone()).run_embedded_migrations(all_embedded_migrations()).await
}

/// Convert a domain integer to the signed column type, refusing values that
/// cannot round-trip.
pub(crate) fn to_db_int(value: u64) -> DomainResult<i64> {
    i64::try_from(value).map_err(|_| DomainError::ValueOutOfRange(value))
}

/// Convert a stored column value back to the domain width.
pub(crate) fn from_db_int(value: i64) -> DomainResult<u64> {
    u64::try_from(value).map_err(|_| DomainError::DatabaseError(format!("negative stored value {value}")))
}

/// Fixed-width RFC 3339 UTC rendering, so string comparisons in SQL order
/// the same way the timestamps do.
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp from a stored row field.
pub(crate) fn parse_timestamp(s: &str) -> DomainResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
