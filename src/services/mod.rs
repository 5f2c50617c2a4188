//! Service layer: the computation engine and its collaborators.

pub mod engine;
pub mod progress;
pub mod sequence_computer;
pub mod stats;

pub use engine::{ComputationEngine, EngineReport, EngineState};
pub use progress::ProgressTracker;
pub use sequence_computer::{reference_steps, SequenceComputer};
pub use stats::StatsAggregator;
