//! Error types for learning runs and benchmark solves.

use quantal_games::{GameError, PlayerId};
use quantal_prob::ProbError;
use thiserror::Error;

/// Errors that can occur while configuring or running a learner, or while
/// computing benchmarks and diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LearnError {
    /// Softmax temperature must be positive and finite.
    #[error("Temperature must be positive and finite, got {tau}")]
    InvalidTemperature { tau: f64 },

    /// A run needs at least one round.
    #[error("Number of rounds must be at least 1")]
    InvalidRounds,

    /// Snapshots are taken every `interval` rounds, so the interval must be positive.
    #[error("Snapshot interval must be at least 1")]
    InvalidSnapshotInterval,

    /// A step size left (0, 1] or became non-finite.
    #[error("Step size {value} at count {count} is outside (0, 1]")]
    InvalidStepSize { count: u64, value: f64 },

    /// A diagnostic needs at least one snapshot.
    #[error("History is empty")]
    EmptyHistory,

    /// The history holds no tables for this player.
    #[error("Player {player} not present in history")]
    PlayerNotInHistory { player: PlayerId },

    /// Error from the game model.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Error from the probability layer.
    #[error(transparent)]
    Prob(#[from] ProbError),
}
