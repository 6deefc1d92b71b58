//! # Independent Learning in Stochastic Games
//!
//! Decentralized, entropy-regularized Q-learning: every player updates its own
//! local Q-table and policy from the single trajectory all players share,
//! without observing anyone else's actions or rewards.
//!
//! - [`IndependentLearner`]: the round-by-round dynamics, recorded into a
//!   [`LearningHistory`]
//! - [`solver`]: exact policy evaluation and value iteration against fixed
//!   opponents, the benchmark learned tables are compared to
//! - [`diagnostics`]: L1 distances and best-response gaps over a history
//!
//! ## Example
//!
//! ```rust
//! use quantal_games::routing::RoutingGame;
//! use quantal_games::PlayerId;
//! use quantal_learning::{diagnostics, IndependentLearner, LearnerConfig};
//!
//! let game = RoutingGame::new(2, 2, 2).build().unwrap();
//! let config = LearnerConfig::default()
//!     .with_rounds(500)
//!     .with_temperature(0.05)
//!     .with_seed(7);
//!
//! let history = IndependentLearner::new(&game, config).unwrap().run().unwrap();
//! assert_eq!(history.len(), 500);
//!
//! let drift = diagnostics::policy_distances(&history, PlayerId(0)).unwrap();
//! assert_eq!(drift.len(), 500);
//! ```
//!
//! ## Pipeline
//!
//! ```text
//!   StochasticGame ──▶ IndependentLearner::run ──▶ LearningHistory
//!         │                                             │
//!         └────────▶ solver (V*, V_π) ◀── diagnostics ◀─┘
//! ```

mod config;
pub mod diagnostics;
mod error;
mod history;
mod learner;
mod schedule;
pub mod solver;

pub use config::LearnerConfig;
pub use error::LearnError;
pub use history::{LearningHistory, Round};
pub use learner::IndependentLearner;
pub use schedule::{Schedule, StepSize};
pub use solver::{
    construct_p_pi, construct_r_pi, evaluate_policy, value_iteration, BestResponseMdp,
    DEFAULT_VALUE_ITERATIONS,
};
