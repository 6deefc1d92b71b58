//! Learner configuration.

use serde::{Deserialize, Serialize};

use crate::{LearnError, Schedule};

/// Parameters of an independent learning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Number of rounds K.
    pub rounds: usize,

    /// Softmax temperature τ; also scales the entropy regularizer.
    pub temperature: f64,

    /// Q step size α, evaluated at Ñ_i[s, a_i].
    pub alpha: Schedule,

    /// Policy step size β, evaluated at N[s].
    pub beta: Schedule,

    /// Seed of the default ChaCha generator.
    pub seed: u64,

    /// Keep a snapshot of the tables every this many rounds.
    /// 1 keeps every round.
    pub snapshot_interval: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            rounds: 100_000,
            temperature: 1e-6,
            alpha: Schedule::sqrt_decay(),
            beta: Schedule::harmonic(),
            seed: 0,
            snapshot_interval: 1,
        }
    }
}

impl LearnerConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_alpha(mut self, alpha: Schedule) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: Schedule) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: usize) -> Self {
        self.snapshot_interval = interval;
        self
    }

    /// Check the parameters before a run starts.
    ///
    /// # Errors
    ///
    /// - [`LearnError::InvalidTemperature`] unless `τ > 0` and finite
    /// - [`LearnError::InvalidRounds`] if `rounds == 0`
    /// - [`LearnError::InvalidSnapshotInterval`] if `snapshot_interval == 0`
    pub fn validate(&self) -> Result<(), LearnError> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(LearnError::InvalidTemperature {
                tau: self.temperature,
            });
        }
        if self.rounds == 0 {
            return Err(LearnError::InvalidRounds);
        }
        if self.snapshot_interval == 0 {
            return Err(LearnError::InvalidSnapshotInterval);
        }
        Ok(())
    }
}
