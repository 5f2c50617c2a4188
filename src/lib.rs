//! Collatz Conjecture Explorer
//!
//! An exploration engine that computes, for every positive integer in
//! increasing order, the number of steps its Collatz trajectory takes to
//! reach the terminal {1, 2, 4} cycle, the peak value visited, and whether
//! it converges to 1. Results accumulate forever in a SQLite store; a
//! separate read-only query API answers questions over the accumulated data.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain** (`domain`): models, errors and the store ports
//! - **Services** (`services`): the sequence computer, progress tracking,
//!   shutdown aggregation and the computation loop state machine
//! - **Adapters** (`adapters`): SQLite implementations of the ports and the
//!   axum query API
//! - **Infrastructure** (`infrastructure`): configuration and log setup
//! - **CLI** (`cli`): the `init` / `run` / `serve` / `stats` commands

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CollatzRecord, ComputationSummary, Config, DistributionStat, RecentAverages, StepCacheEntry,
    Trajectory,
};
pub use domain::ports::{ResultQueries, SequenceStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    reference_steps, ComputationEngine, EngineReport, EngineState, ProgressTracker,
    SequenceComputer, StatsAggregator,
};
