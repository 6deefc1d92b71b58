//! Exact benchmarks for one player against fixed opponents.
//!
//! Two reductions of the game, both marginalizing the opponents' fixed
//! joint policy `π_{-i}` out of `P` and `R`:
//!
//! - With player `i`'s policy fixed as well, the game collapses to a Markov
//!   reward process `(P_π, r_π)` whose value is `V = (I − δ P_π)⁻¹ r_π`.
//! - With `i`'s actions left free, it collapses to the best-response MDP
//!   ([`BestResponseMdp`]), solved by value iteration.
//!
//! None of this runs inside the learning loop; it is the yardstick the
//! diagnostics measure learned tables against.

use quantal_games::{
    ActionProfile, GameError, JointPolicy, LocalQFunction, PlayerId, Policy, StateId,
    StochasticGame, VFunction,
};
use quantal_prob::Kernel;

use crate::LearnError;

/// Default number of Bellman backups in [`value_iteration`].
pub const DEFAULT_VALUE_ITERATIONS: usize = 100_000;

/// Opponent policies must cover exactly the other players.
fn check_opponents(
    game: &StochasticGame,
    player: PlayerId,
    opponents: &JointPolicy,
) -> Result<(), LearnError> {
    game.players().get(player)?;
    let expected = game.num_players() - 1;
    if opponents.len() != expected {
        return Err(GameError::ShapeMismatch {
            component: "opponent policies",
            expected,
            got: opponents.len(),
        }
        .into());
    }
    if opponents.players().any(|p| p == player) {
        return Err(GameError::IncompleteProfile { player }.into());
    }
    Ok(())
}

/// Weight of joint action `a` at `s` under `π_i × π_{-i}`.
fn joint_weight(
    s: StateId,
    a: &ActionProfile,
    player: PlayerId,
    policy: &Policy,
    opponents: &JointPolicy,
) -> Result<f64, LearnError> {
    Ok(policy.prob(s, a[player]) * opponents.prob(s, &a.minus(player))?)
}

/// `P_π[s][s'] = Σ_a π_i(a_i|s) π_{-i}(a_{-i}|s) P(s' | s, a)`.
///
/// # Errors
///
/// Fails if the opponents do not cover exactly the other players, or if the
/// resulting matrix is not row-stochastic (an unnormalized policy).
pub fn construct_p_pi(
    game: &StochasticGame,
    player: PlayerId,
    policy: &Policy,
    opponents: &JointPolicy,
) -> Result<Kernel, LearnError> {
    check_opponents(game, player, opponents)?;
    let n = game.num_states();
    let mut rows = vec![vec![0.0; n]; n];
    for s in game.states().ids() {
        for (index, a) in game.actions().iter().enumerate() {
            let w = joint_weight(s, &a, player, policy, opponents)?;
            if w == 0.0 {
                continue;
            }
            let next = game.transition_row_by_index(s, index)?;
            for (out, p) in rows[s.index()].iter_mut().zip(next) {
                *out += w * p;
            }
        }
    }
    Ok(Kernel::new(rows)?)
}

/// `r_π[s] = Σ_a π_i(a_i|s) π_{-i}(a_{-i}|s) R_i(s, a)`.
pub fn construct_r_pi(
    game: &StochasticGame,
    player: PlayerId,
    policy: &Policy,
    opponents: &JointPolicy,
) -> Result<Vec<f64>, LearnError> {
    check_opponents(game, player, opponents)?;
    game.states()
        .ids()
        .map(|s| {
            game.actions()
                .iter()
                .enumerate()
                .try_fold(0.0, |acc, (index, a)| -> Result<f64, LearnError> {
                    let w = joint_weight(s, &a, player, policy, opponents)?;
                    Ok(acc + w * game.reward_by_index(player, s, index)?)
                })
        })
        .collect()
}

/// Exact value `V_i(π_i, π_{-i})` by a dense linear solve.
pub fn evaluate_policy(
    game: &StochasticGame,
    player: PlayerId,
    policy: &Policy,
    opponents: &JointPolicy,
) -> Result<VFunction, LearnError> {
    let p_pi = construct_p_pi(game, player, policy, opponents)?;
    let r_pi = construct_r_pi(game, player, policy, opponents)?;
    let v = p_pi.evaluate(&r_pi, game.discount())?;
    Ok(VFunction::new(player, v))
}

/// Player `i`'s MDP against fixed opponents: `|S|×|Aᵢ|×|S|` transitions and
/// `|S|×|Aᵢ|` rewards.
#[derive(Debug, Clone, PartialEq)]
pub struct BestResponseMdp {
    player: PlayerId,
    n_states: usize,
    n_actions: usize,
    discount: f64,
    /// `transitions[(s · |Aᵢ| + a) · |S| + s']`
    transitions: Vec<f64>,
    /// `rewards[s · |Aᵢ| + a]`
    rewards: Vec<f64>,
}

impl BestResponseMdp {
    /// Marginalize the opponents out of `P` and `R`, enumerating each of
    /// `i`'s deviations against every opponent joint action.
    pub fn build(
        game: &StochasticGame,
        player: PlayerId,
        opponents: &JointPolicy,
    ) -> Result<Self, LearnError> {
        check_opponents(game, player, opponents)?;
        let n_states = game.num_states();
        let own = game.action_set(player)?;
        let n_actions = own.len();
        let opponent_profiles = game.actions().minus(player);

        let mut transitions = vec![0.0; n_states * n_actions * n_states];
        let mut rewards = vec![0.0; n_states * n_actions];
        for s in game.states().ids() {
            for opp in opponent_profiles.iter() {
                let w = opponents.prob(s, &opp)?;
                if w == 0.0 {
                    continue;
                }
                for a in own.ids() {
                    let index = game.actions().index_of(&ActionProfile::merge(a, &opp))?;
                    let sa = s.index() * n_actions + a.index();
                    rewards[sa] += w * game.reward_by_index(player, s, index)?;
                    let next = game.transition_row_by_index(s, index)?;
                    let out = &mut transitions[sa * n_states..(sa + 1) * n_states];
                    for (t, p) in out.iter_mut().zip(next) {
                        *t += w * p;
                    }
                }
            }
        }

        log::debug!(
            "best-response MDP for player {}: {} states x {} actions",
            player,
            n_states,
            n_actions
        );

        Ok(Self {
            player,
            n_states,
            n_actions,
            discount: game.discount(),
            transitions,
            rewards,
        })
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

    /// Reduced reward `R(s, aᵢ)`.
    pub fn reward(&self, state: StateId, action: usize) -> Option<f64> {
        if state.index() >= self.n_states || action >= self.n_actions {
            return None;
        }
        Some(self.rewards[state.index() * self.n_actions + action])
    }

    /// Reduced transition row `P(· | s, aᵢ)`.
    pub fn transition_row(&self, state: StateId, action: usize) -> Option<&[f64]> {
        if state.index() >= self.n_states || action >= self.n_actions {
            return None;
        }
        let sa = state.index() * self.n_actions + action;
        Some(&self.transitions[sa * self.n_states..(sa + 1) * self.n_states])
    }

    /// `Q(s, aᵢ) = R(s, aᵢ) + δ Σ_{s'} P(s' | s, aᵢ) V(s')`.
    pub fn action_values(&self, v: &VFunction) -> Result<LocalQFunction, LearnError> {
        if v.len() != self.n_states {
            return Err(GameError::ShapeMismatch {
                component: "value function",
                expected: self.n_states,
                got: v.len(),
            }
            .into());
        }
        Ok(LocalQFunction::from_fn(
            self.player,
            self.n_states,
            self.n_actions,
            |s, a| {
                let sa = s.index() * self.n_actions + a.index();
                let row = &self.transitions[sa * self.n_states..(sa + 1) * self.n_states];
                let continuation: f64 = row.iter().zip(v.values()).map(|(p, v)| p * v).sum();
                self.rewards[sa] + self.discount * continuation
            },
        ))
    }

    /// One Bellman optimality backup `V ↦ max_{aᵢ} Q(·, aᵢ)`.
    pub fn backup(&self, v: &VFunction) -> Result<VFunction, LearnError> {
        let q = self.action_values(v)?;
        let values = (0..self.n_states)
            .map(|s| {
                q.row(StateId(s))
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect();
        Ok(VFunction::new(self.player, values))
    }

    /// A deterministic best response to `v`: the greedy policy of its Q.
    pub fn greedy_actions(&self, v: &VFunction) -> Result<Policy, LearnError> {
        Ok(Policy::greedy(self.player, &self.action_values(v)?))
    }
}

/// `T` Bellman optimality backups from `V₀ = 0`.
///
/// Returns `[V₀, V₁, …, V_T]`, so the result has `T + 1` entries and
/// `history[1]` is the first backup.
pub fn value_iteration(
    game: &StochasticGame,
    player: PlayerId,
    opponents: &JointPolicy,
    iterations: usize,
) -> Result<Vec<VFunction>, LearnError> {
    let mdp = BestResponseMdp::build(game, player, opponents)?;
    let mut history = Vec::with_capacity(iterations + 1);
    history.push(VFunction::zeros(player, game.num_states()));
    for _ in 0..iterations {
        let next = match history.last() {
            Some(v) => mdp.backup(v)?,
            None => break,
        };
        history.push(next);
    }
    if let [.., prev, last] = history.as_slice() {
        let moved = last.sup_distance(prev)?;
        log::debug!(
            "value iteration for player {}: {} backups, last step moved {:.3e}",
            player,
            iterations,
            moved
        );
    }
    Ok(history)
}
