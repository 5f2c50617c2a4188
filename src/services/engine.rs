//! The computation loop: an unbounded sequential walk over the integer
//! frontier with graceful-shutdown interception.
//!
//! A termination signal never interrupts a unit of work; the flag is
//! observed between iterations, so the in-flight computation always
//! finishes and commits before the drain begins.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CollatzRecord, EngineConfig};
use crate::domain::ports::SequenceStore;
use crate::services::{ProgressTracker, SequenceComputer, StatsAggregator};

/// Lifecycle of the computation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Resolving the resume point.
    Starting,
    /// Advancing the frontier.
    Running,
    /// Shutdown requested; aggregating the distribution snapshot.
    Draining,
    /// Terminal.
    Stopped,
}

/// What a finished run covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineReport {
    /// First starting number processed this run (the resume point).
    pub resume_point: u64,
    /// Next starting number a future run would begin at.
    pub next: u64,
    /// How many starting numbers this run committed.
    pub processed: u64,
}

/// Sequential computation engine; the sole writer of the store.
pub struct ComputationEngine {
    store: Arc<dyn SequenceStore>,
    computer: SequenceComputer,
    tracker: ProgressTracker,
    aggregator: StatsAggregator,
    config: EngineConfig,
    shutdown_rx: watch::Receiver<bool>,
    state: EngineState,
}

impl ComputationEngine {
    /// Build an engine over `store`. Flipping the watch flag to `true`
    /// requests the drain transition.
    pub fn new(
        store: Arc<dyn SequenceStore>,
        config: EngineConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            computer: SequenceComputer::new(Arc::clone(&store)),
            tracker: ProgressTracker::new(Arc::clone(&store)),
            aggregator: StatsAggregator::new(Arc::clone(&store)),
            store,
            config,
            shutdown_rx,
            state: EngineState::Stopped,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run until a shutdown request or a fatal error.
    ///
    /// A computation or commit failure for some starting number is fatal:
    /// it is logged with the offending number and aborts the loop without
    /// the drain-time aggregation. Only the signal-driven drain aggregates.
    pub async fn run(&mut self) -> DomainResult<EngineReport> {
        self.state = EngineState::Starting;
        let resume_point = self.tracker.resume_point().await?;
        info!(resume_point, "starting computation frontier");

        self.state = EngineState::Running;
        let mut next = resume_point;
        while !*self.shutdown_rx.borrow() {
            match self.process(next).await {
                Ok(record) => {
                    debug!(
                        starting_number = next,
                        steps = record.number_of_steps,
                        max_value = record.max_value,
                        converges = record.convergence,
                        "committed"
                    );
                }
                Err(err) => {
                    error!(starting_number = next, error = %err, "fatal computation error");
                    self.state = EngineState::Stopped;
                    return Err(err);
                }
            }
            next += 1;
            if next % self.config.report_interval == 0 {
                info!(frontier = next, "progress");
            }
        }

        self.state = EngineState::Draining;
        info!(frontier = next, "shutdown requested, draining");
        self.aggregator.compute_and_persist().await?;

        self.state = EngineState::Stopped;
        Ok(EngineReport {
            resume_point,
            next,
            processed: next - resume_point,
        })
    }

    /// One unit of work: walk the trajectory, then append its result row.
    /// The walk commits its own cache backfill; a crash between the two
    /// commits leaves only valid cache entries behind.
    async fn process(&self, starting_number: u64) -> DomainResult<CollatzRecord> {
        let trajectory = self.computer.compute(starting_number).await?;
        let record = CollatzRecord::from_trajectory(starting_number, &trajectory, Utc::now());
        self.store.append_result(&record).await?;
        Ok(record)
    }
}
