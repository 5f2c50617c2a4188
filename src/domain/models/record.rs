//! Result, cache and statistics models persisted by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One committed exploration result, append-only, one row per starting number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollatzRecord {
    /// The integer whose trajectory was computed. Unique, primary ordering key.
    pub starting_number: u64,
    /// Transformation steps from the starting number to the walk's stopping point.
    pub number_of_steps: u64,
    /// Largest value the walk visited before it stopped.
    pub max_value: u64,
    /// `number_of_steps - 1` by the inherited policy; -1 for the degenerate n=1 row.
    pub sequence_length: i64,
    /// Whether the walk stopped exactly at 1.
    pub convergence: bool,
    /// Commit time of the row.
    pub timestamp: DateTime<Utc>,
}

impl CollatzRecord {
    /// Build the result row for a completed trajectory.
    pub fn from_trajectory(starting_number: u64, trajectory: &Trajectory, timestamp: DateTime<Utc>) -> Self {
        Self {
            starting_number,
            number_of_steps: trajectory.steps,
            max_value: trajectory.max_value,
            sequence_length: trajectory.sequence_length,
            convergence: trajectory.converges,
            timestamp,
        }
    }
}

/// Outcome of a single memoized walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trajectory {
    /// Total steps to the stopping point, cached suffix included.
    pub steps: u64,
    /// Largest value visited before the walk stopped.
    pub max_value: u64,
    /// `steps - 1`, kept signed for the zero-step edge.
    pub sequence_length: i64,
    /// True iff the stopping point was exactly 1.
    pub converges: bool,
}

/// A memoization entry: remaining steps from `number` to the stopping point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCacheEntry {
    /// The visited number.
    pub number: u64,
    /// Remaining transformation steps from `number`.
    pub steps: u64,
}

/// One named statistic of the max-value distribution snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStat {
    /// Statistic name: min, max, mean, median or std_dev.
    pub stat_name: String,
    /// Statistic value.
    pub value: f64,
}

/// Averages over the most recently committed results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentAverages {
    /// Mean step count, absent when no rows exist.
    pub average_number_of_steps: Option<f64>,
    /// Mean max value, absent when no rows exist.
    pub average_max_value: Option<f64>,
}

/// Whole-store computation summary served by the stats surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputationSummary {
    /// Highest committed starting number, 0 on an empty store.
    pub last_checked_number: u64,
    /// Wall-clock seconds between the first and last committed row.
    pub total_computation_time: f64,
    /// Mean step count over all rows, 0 on an empty store.
    pub average_steps: f64,
}
