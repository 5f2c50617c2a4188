//! Memoized Collatz walk.
//!
//! Walks a trajectory until it reaches the {1, 2, 4} anchor cycle or a number
//! whose remaining distance is already cached, then backfills a cache entry
//! for every number visited, so each prefix of each trajectory ever computed
//! becomes a cache hit for future starting numbers.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{StepCacheEntry, Trajectory};
use crate::domain::ports::SequenceStore;

/// Computes one starting number's trajectory against the shared store.
pub struct SequenceComputer {
    store: Arc<dyn SequenceStore>,
}

impl SequenceComputer {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// Compute total steps, peak value and convergence for `n`.
    ///
    /// The walk stops at the first of: the current number is exactly 1
    /// (already terminal), the current number has a cached remaining-step
    /// count (the suffix supplies the rest), or a transform lands in the
    /// {1, 2, 4} anchor set. Convergence is true only when the stopping
    /// value is 1; a walk stopping at 2 or 4 is recorded non-convergent
    /// even though the trajectory provably reaches 1 a step or two later.
    ///
    /// `max_value` covers the locally walked prefix. A cached suffix does
    /// not contribute to it, so the recorded peak for a number whose walk
    /// stops on a cache hit is the peak seen before the hit.
    pub async fn compute(&self, n: u64) -> DomainResult<Trajectory> {
        let mut current = n;
        let mut steps: u64 = 0;
        let mut max_value = n;
        let mut visited: Vec<u64> = Vec::new();
        let mut cache_stop = false;

        let stopped_at = loop {
            visited.push(current);

            if current == 1 {
                break 1;
            }
            if let Some(cached) = self.store.cached_steps(current).await? {
                steps += cached;
                cache_stop = true;
                break current;
            }

            current = next_value(current)?;
            steps += 1;
            max_value = max_value.max(current);

            if matches!(current, 1 | 2 | 4) {
                break current;
            }
        };

        let converges = if cache_stop {
            // A cache hit hides the suffix's stopping point; the flag recorded
            // when that suffix was first walked carries it forward.
            match self.store.convergence_of(stopped_at).await? {
                Some(flag) => flag,
                None => stopped_at == 1,
            }
        } else {
            stopped_at == 1
        };

        let entries: Vec<StepCacheEntry> = visited
            .iter()
            .enumerate()
            .map(|(position, &number)| StepCacheEntry { number, steps: steps - position as u64 })
            .collect();
        self.store.record_walk(&entries, n, converges).await?;

        Ok(Trajectory {
            steps,
            max_value,
            sequence_length: steps as i64 - 1,
            converges,
        })
    }
}

/// One Collatz transform with overflow detection.
fn next_value(n: u64) -> DomainResult<u64> {
    if n % 2 == 0 {
        Ok(n / 2)
    } else {
        n.checked_mul(3)
            .and_then(|tripled| tripled.checked_add(1))
            .ok_or(DomainError::ArithmeticOverflow(n))
    }
}

/// Unmemoized step count to the anchor set, under the same stopping rule.
/// The independent reference the memoized walk must agree with.
pub fn reference_steps(n: u64) -> u64 {
    let mut current = n;
    let mut steps = 0;
    while current != 1 {
        current = if current % 2 == 0 { current / 2 } else { 3 * current + 1 };
        steps += 1;
        if matches!(current, 1 | 2 | 4) {
            break;
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_walks_anchor_edges() {
        assert_eq!(reference_steps(1), 0);
        assert_eq!(reference_steps(2), 1);
        assert_eq!(reference_steps(4), 1);
        assert_eq!(reference_steps(8), 1);
    }

    #[test]
    fn reference_walks_known_trajectories() {
        // 6 -> 3 -> 10 -> 5 -> 16 -> 8 -> 4
        assert_eq!(reference_steps(6), 6);
        // 7 -> 22 -> 11 -> 34 -> 17 -> 52 -> 26 -> 13 -> 40 -> 20 -> 10 -> 5 -> 16 -> 8 -> 4
        assert_eq!(reference_steps(7), 14);
    }

    #[test]
    fn next_value_halves_and_triples() {
        assert_eq!(next_value(10).unwrap(), 5);
        assert_eq!(next_value(5).unwrap(), 16);
    }

    #[test]
    fn next_value_refuses_overflow() {
        let huge = u64::MAX - 2; // odd
        assert!(matches!(next_value(huge), Err(DomainError::ArithmeticOverflow(_))));
    }
}
