//! Annealing results and progress events.

use crate::schedule::Schedule;

/// Parameters derived by the adaptive calibration walk.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// Length of the calibration walk.
    pub stats_iterations: usize,
    /// Damped mean absolute makespan change per move (at least 1).
    pub average_step: u64,
    /// Estimated starting temperature.
    pub initial_temperature: f64,
    /// Estimated geometric cooling factor.
    pub cooling_factor: f64,
}

/// Structured progress event emitted by an annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnealEvent {
    /// Adaptive calibration finished; the optimization phase starts.
    Calibrated(Calibration),

    /// The best makespan strictly improved.
    NewBest {
        /// Zero-based iteration of the optimization phase.
        iteration: usize,
        /// New best makespan.
        makespan: u64,
        /// Temperature at which the move was accepted.
        temperature: f64,
    },
}

/// Result of an annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealResult {
    /// Best schedule found.
    pub schedule: Schedule,

    /// Makespan of the best schedule.
    pub makespan: u64,

    /// Makespan of the starting schedule.
    pub initial_makespan: u64,

    /// Optimization iterations executed.
    pub iterations: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Temperature after the last iteration.
    pub final_temperature: f64,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best makespan sampled at regular intervals; non-increasing.
    pub best_history: Vec<u64>,

    /// Calibration outcome, for adaptive runs.
    pub calibration: Option<Calibration>,
}
