//! Repository ports implemented by the SQLite adapters.

pub mod result_queries;
pub mod sequence_store;

pub use result_queries::ResultQueries;
pub use sequence_store::SequenceStore;
