//! Policies: state → distribution over one player's actions.
//!
//! A [`Policy`] is a dense row-stochastic table `π_i[s, a_i]`; a
//! [`JointPolicy`] holds one per player and answers joint and opponents-only
//! probabilities.
//!
//! ```text
//!        ┌──────────┐
//!    s ─▶│   π_i    │─▶ Δ(A_i)
//!        └──────────┘
//! ```

use quantal_prob::{categorical, softmax};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    ActionId, ActionProfile, GameError, LocalQFunction, PlayerId, ProfileView, StateId,
    StochasticGame,
};

// ============================================================================
// Single-player Policy
// ============================================================================

/// Stationary mixed policy of one player, stored row-major `[s][a_i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    player: PlayerId,
    n_states: usize,
    n_actions: usize,
    probs: Vec<f64>,
}

impl Policy {
    /// Every action equally likely in every state.
    pub fn uniform(player: PlayerId, n_states: usize, n_actions: usize) -> Self {
        let p = if n_actions == 0 {
            0.0
        } else {
            1.0 / n_actions as f64
        };
        Self {
            player,
            n_states,
            n_actions,
            probs: vec![p; n_states * n_actions],
        }
    }

    /// Tabulate `f(s, a_i)`. Rows are not renormalized; check with
    /// [`Policy::is_normalized`] when the source is untrusted.
    pub fn from_fn<F>(player: PlayerId, n_states: usize, n_actions: usize, mut f: F) -> Self
    where
        F: FnMut(StateId, ActionId) -> f64,
    {
        let mut probs = Vec::with_capacity(n_states * n_actions);
        for s in 0..n_states {
            for a in 0..n_actions {
                probs.push(f(StateId(s), ActionId(a)));
            }
        }
        Self {
            player,
            n_states,
            n_actions,
            probs,
        }
    }

    /// Deterministic policy picking the highest-valued action in each state
    /// (ties go to the lowest action id).
    pub fn greedy(player: PlayerId, q: &LocalQFunction) -> Self {
        let mut policy = Self::from_fn(player, q.n_states(), q.n_actions(), |_, _| 0.0);
        for s in 0..q.n_states() {
            let row = q.row(StateId(s));
            let mut best = 0;
            for (a, &value) in row.iter().enumerate() {
                if value > row[best] {
                    best = a;
                }
            }
            if let Some(p) = policy.row_mut(StateId(s)).get_mut(best) {
                *p = 1.0;
            }
        }
        policy
    }

    /// Boltzmann policy `softmax(q[s, ·] / τ)` in each state.
    pub fn softmax(
        player: PlayerId,
        q: &LocalQFunction,
        temperature: f64,
    ) -> Result<Self, GameError> {
        let mut policy = Self::uniform(player, q.n_states(), q.n_actions());
        for s in 0..q.n_states() {
            let dist = softmax(q.row(StateId(s)), temperature)?;
            policy.row_mut(StateId(s)).copy_from_slice(&dist.p);
        }
        Ok(policy)
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// `π_i(a_i | s)`, or 0 outside the table.
    pub fn prob(&self, state: StateId, action: ActionId) -> f64 {
        if state.index() >= self.n_states || action.index() >= self.n_actions {
            return 0.0;
        }
        self.probs[state.index() * self.n_actions + action.index()]
    }

    pub fn set_prob(
        &mut self,
        state: StateId,
        action: ActionId,
        value: f64,
    ) -> Result<(), GameError> {
        if state.index() >= self.n_states {
            return Err(GameError::UnknownState { state });
        }
        if action.index() >= self.n_actions {
            return Err(GameError::UnknownAction {
                player: self.player,
                action: action.index(),
            });
        }
        self.probs[state.index() * self.n_actions + action.index()] = value;
        Ok(())
    }

    /// `π_i(· | s)`. Panics if `state` is outside the table.
    pub fn row(&self, state: StateId) -> &[f64] {
        let start = state.index() * self.n_actions;
        &self.probs[start..start + self.n_actions]
    }

    /// Mutable `π_i(· | s)`. Panics if `state` is outside the table.
    pub fn row_mut(&mut self, state: StateId) -> &mut [f64] {
        let start = state.index() * self.n_actions;
        &mut self.probs[start..start + self.n_actions]
    }

    /// Draw `a_i ~ π_i(· | s)`.
    pub fn sample_action<R: Rng + ?Sized>(
        &self,
        state: StateId,
        rng: &mut R,
    ) -> Result<ActionId, GameError> {
        if state.index() >= self.n_states {
            return Err(GameError::UnknownState { state });
        }
        Ok(ActionId(categorical(self.row(state), rng)?))
    }

    /// Every row is non-negative and sums to 1 within `tol`.
    pub fn is_normalized(&self, tol: f64) -> bool {
        self.probs.chunks(self.n_actions.max(1)).all(|row| {
            row.iter().all(|&p| p >= -tol) && (row.iter().sum::<f64>() - 1.0).abs() <= tol
        })
    }

    /// `Σ_s Σ_a |π(a|s) − π'(a|s)|`.
    pub fn l1_distance(&self, other: &Policy) -> Result<f64, GameError> {
        if self.probs.len() != other.probs.len() {
            return Err(GameError::ShapeMismatch {
                component: "policy",
                expected: self.probs.len(),
                got: other.probs.len(),
            });
        }
        Ok(quantal_prob::l1_distance(&self.probs, &other.probs)?)
    }
}

// ============================================================================
// Joint Policy
// ============================================================================

/// Policies of a set of players, ordered by player id.
///
/// A joint policy over all players drives sampling; one without player `i`
/// (see [`JointPolicy::minus`]) weighs opponents' joint actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointPolicy {
    policies: Vec<Policy>,
}

impl JointPolicy {
    /// Collect policies, sorting them by player id.
    pub fn new(mut policies: Vec<Policy>) -> Self {
        policies.sort_by_key(|p| p.player);
        Self { policies }
    }

    /// The uniform policy of every player in `game`.
    pub fn uniform(game: &StochasticGame) -> Self {
        let n_states = game.num_states();
        let policies = game
            .actions()
            .action_sets()
            .iter()
            .map(|set| Policy::uniform(set.player(), n_states, set.len()))
            .collect();
        Self { policies }
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.policies.iter().map(|p| p.player)
    }

    pub fn policy(&self, player: PlayerId) -> Result<&Policy, GameError> {
        self.policies
            .iter()
            .find(|p| p.player == player)
            .ok_or(GameError::IncompleteProfile { player })
    }

    pub fn policy_mut(&mut self, player: PlayerId) -> Result<&mut Policy, GameError> {
        self.policies
            .iter_mut()
            .find(|p| p.player == player)
            .ok_or(GameError::IncompleteProfile { player })
    }

    /// `Π_j π_j(a_j | s)` over the players held here.
    ///
    /// Works for full profiles and for opponents' profiles alike.
    ///
    /// # Errors
    ///
    /// [`GameError::IncompleteProfile`] if `profile` has no action for one of
    /// the held players.
    pub fn prob<P: ProfileView + ?Sized>(
        &self,
        state: StateId,
        profile: &P,
    ) -> Result<f64, GameError> {
        self.policies.iter().try_fold(1.0, |acc, policy| {
            let action = profile
                .action_of(policy.player)
                .ok_or(GameError::IncompleteProfile {
                    player: policy.player,
                })?;
            Ok(acc * policy.prob(state, action))
        })
    }

    /// The joint policy without `player`.
    pub fn minus(&self, player: PlayerId) -> JointPolicy {
        Self {
            policies: self
                .policies
                .iter()
                .filter(|p| p.player != player)
                .cloned()
                .collect(),
        }
    }

    /// Sample every player's action independently.
    ///
    /// # Errors
    ///
    /// [`GameError::IncompleteProfile`] unless the held players are exactly
    /// `0..n`.
    pub fn sample_joint_action<R: Rng + ?Sized>(
        &self,
        state: StateId,
        rng: &mut R,
    ) -> Result<ActionProfile, GameError> {
        let mut actions = Vec::with_capacity(self.policies.len());
        for (i, policy) in self.policies.iter().enumerate() {
            if policy.player != PlayerId(i) {
                return Err(GameError::IncompleteProfile { player: PlayerId(i) });
            }
            actions.push(policy.sample_action(state, rng)?);
        }
        Ok(ActionProfile::new(actions))
    }

    /// Sum of per-player L1 distances.
    pub fn l1_distance(&self, other: &JointPolicy) -> Result<f64, GameError> {
        if self.policies.len() != other.policies.len() {
            return Err(GameError::ShapeMismatch {
                component: "joint policy",
                expected: self.policies.len(),
                got: other.policies.len(),
            });
        }
        self.policies
            .iter()
            .zip(other.policies.iter())
            .map(|(a, b)| a.l1_distance(b))
            .sum()
    }
}
