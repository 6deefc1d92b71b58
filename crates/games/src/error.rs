//! Error types for game construction and lookup.

use quantal_prob::ProbError;
use thiserror::Error;

use crate::{PlayerId, StateId};

/// Errors that can occur while building or querying a stochastic game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// A game needs at least one player.
    #[error("Game has no players")]
    NoPlayers,

    /// A game needs at least one state.
    #[error("Game has no states")]
    NoStates,

    /// Every player needs at least one action.
    #[error("Player {player} has no actions")]
    NoActions { player: PlayerId },

    /// Two states registered with the same value.
    #[error("Duplicate state value {value:?}")]
    DuplicateState { value: Vec<i64> },

    /// A player registered the same action value twice.
    #[error("Duplicate action value {value} for player {player}")]
    DuplicateAction { player: PlayerId, value: i64 },

    /// Too many joint actions to index with `usize`.
    #[error("Joint action space overflows usize")]
    ActionSpaceOverflow,

    /// Discount factor outside [0, 1).
    #[error("Discount factor must lie in [0, 1), got {discount}")]
    InvalidDiscount { discount: f64 },

    /// A transition row P(· | s, a) does not sum to 1.
    #[error("Transition row for state {state}, joint action {profile} sums to {sum} (expected 1.0)")]
    TransitionRowNotNormalized {
        state: StateId,
        profile: usize,
        sum: f64,
    },

    /// A transition probability is negative or non-finite.
    #[error("Invalid transition probability {value} for state {state}, joint action {profile}")]
    InvalidTransitionProbability {
        state: StateId,
        profile: usize,
        value: f64,
    },

    /// Initial-state distribution is invalid.
    #[error("Invalid initial-state distribution: {0}")]
    InitialDistribution(ProbError),

    /// A state has no initial probability in an explicit table.
    #[error("No initial probability given for state {state}")]
    MissingInitialProbability { state: StateId },

    /// A (player, state, joint action) entry is missing from an explicit reward table.
    #[error("No reward given for player {player}, state {state}, joint action {profile}")]
    MissingReward {
        player: PlayerId,
        state: StateId,
        profile: usize,
    },

    /// Reward is NaN or infinite.
    #[error("Non-finite reward {value} for player {player}, state {state}, joint action {profile}")]
    NonFiniteReward {
        player: PlayerId,
        state: StateId,
        profile: usize,
        value: f64,
    },

    /// Player id not registered in this game.
    #[error("Unknown player: {player}")]
    UnknownPlayer { player: PlayerId },

    /// State id not registered in this game.
    #[error("Unknown state: {state}")]
    UnknownState { state: StateId },

    /// Action id outside the player's action set.
    #[error("Unknown action {action} for player {player}")]
    UnknownAction { player: PlayerId, action: usize },

    /// A profile or joint policy does not cover the players an operation needs.
    #[error("Profile does not cover player {player}")]
    IncompleteProfile { player: PlayerId },

    /// Components were built for different state or action spaces.
    #[error("Shape mismatch in {component}: expected {expected}, got {got}")]
    ShapeMismatch {
        component: &'static str,
        expected: usize,
        got: usize,
    },

    /// A scenario parameter is outside its valid range.
    #[error("Invalid value {value} for parameter {parameter}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
    },

    /// Underlying probability error (sampling, softmax, kernels).
    #[error(transparent)]
    Prob(#[from] ProbError),
}
