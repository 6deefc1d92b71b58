//! Step-size schedules `α(n)`, `β(n)` as functions of a visit count.

use serde::{Deserialize, Serialize};

/// A step size as a function of how often the updated entry was visited.
///
/// Counts start at 1: the learner increments before it asks.
pub trait StepSize {
    fn step(&self, count: u64) -> f64;
}

impl<F> StepSize for F
where
    F: Fn(u64) -> f64,
{
    fn step(&self, count: u64) -> f64 {
        self(count)
    }
}

/// Serializable step-size schedule.
///
/// ```rust
/// use quantal_learning::{Schedule, StepSize};
///
/// let alpha = Schedule::Power { exponent: 0.5 };
/// assert!((alpha.step(4) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// `n^-exponent`
    Power { exponent: f64 },
    /// The same step every round.
    Constant { value: f64 },
}

impl Schedule {
    /// `n^-0.5`, the default Q step.
    pub fn sqrt_decay() -> Self {
        Self::Power { exponent: 0.5 }
    }

    /// `n^-1`, the default policy step.
    pub fn harmonic() -> Self {
        Self::Power { exponent: 1.0 }
    }
}

impl StepSize for Schedule {
    fn step(&self, count: u64) -> f64 {
        match *self {
            Schedule::Power { exponent } => (count.max(1) as f64).powf(-exponent),
            Schedule::Constant { value } => value,
        }
    }
}
