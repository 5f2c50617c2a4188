//! Domain models for the Collatz exploration engine.

pub mod config;
pub mod record;

pub use config::{CommitRetryConfig, Config, DatabaseConfig, EngineConfig, LoggingConfig, ServerConfig};
pub use record::{
    CollatzRecord, ComputationSummary, DistributionStat, RecentAverages, StepCacheEntry, Trajectory,
};
