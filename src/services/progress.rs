//! Crash-resumable frontier tracking.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::ports::SequenceStore;

/// Derives the next starting number from the highest committed result row.
///
/// Queried exactly once at engine start; afterwards the engine owns the
/// counter in memory, being the sole writer.
pub struct ProgressTracker {
    store: Arc<dyn SequenceStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// `max(starting_number) + 1`, or 1 on an empty store. Pure read.
    pub async fn resume_point(&self) -> DomainResult<u64> {
        Ok(self.store.max_starting_number().await?.map_or(1, |highest| highest + 1))
    }
}
