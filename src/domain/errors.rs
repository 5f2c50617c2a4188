//! Domain errors for the Collatz exploration engine.

use thiserror::Error;

/// Domain-level errors surfaced by the engine and its stores.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("arithmetic overflow advancing the trajectory at {0}")]
    ArithmeticOverflow(u64),

    #[error("value {0} does not fit the storage integer width")]
    ValueOutOfRange(u64),

    #[error("result row for {0} already committed")]
    DuplicateResult(u64),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Convenience result alias used throughout the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
