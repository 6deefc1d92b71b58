//! # Finite Stochastic Games
//!
//! This crate models finite discounted stochastic games
//! `G = (I, S, A, μ, P, R, δ)` and the tabular objects that live on them:
//!
//! - Players, states and per-player action sets, identified by dense ids
//! - The joint action space [`ActionProfileSet`] with mixed-radix indexing
//! - Dynamics: [`InitialStateDistribution`], [`TransitionKernel`], [`RewardFunction`]
//! - [`Policy`] / [`JointPolicy`] and the Q/V tables in [`value`]
//!
//! ## Example
//!
//! ```rust
//! use quantal_games::{JointPolicy, PlayerId, StateId};
//! use quantal_games::routing::RoutingGame;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = RoutingGame::new(2, 2, 2)
//!     .with_slopes(vec![2.0, 4.0])
//!     .with_intercepts(vec![9.0, 16.0])
//!     .build()
//!     .unwrap();
//!
//! let pi = JointPolicy::uniform(&game);
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let s = game.sample_initial_state(&mut rng).unwrap();
//! let a = pi.sample_joint_action(s, &mut rng).unwrap();
//! let r = game.reward(PlayerId(0), s, &a).unwrap();
//! let next = game.sample_next_state(s, &a, &mut rng).unwrap();
//! assert!(next.index() < game.num_states());
//! assert!(r.is_finite());
//! # let _ = StateId(0);
//! ```
//!
//! ## One Round of Play
//!
//! ```text
//!          ┌──────────┐   a = (a_1, …, a_N)   ┌──────────┐
//!    s ───▶│  π_1..N  │──────────────────────▶│  P, R    │──▶ (s', r_1..N)
//!          └──────────┘                       └──────────┘
//! ```
//!
//! Swap the policies → different play, same game.
//! Swap the game → same learner, different world.

mod action;
mod error;
mod game;
mod model;
pub mod policy;
mod reward;
pub mod routing;
mod transition;
pub mod value;

pub use action::{
    Action, ActionProfile, ActionProfileSet, ActionSet, OpponentProfile, OpponentProfileSet,
    ProfileView,
};
pub use error::GameError;
pub use game::{GameBuilder, StochasticGame};
pub use model::{ActionId, Player, PlayerId, PlayerSet, State, StateId, StateSet};
pub use policy::{JointPolicy, Policy};
pub use reward::RewardFunction;
pub use transition::{InitialStateDistribution, TransitionKernel};
pub use value::{
    JointLocalQFunction, JointQFunction, JointVFunction, LocalQFunction, QFunction, VFunction,
};
