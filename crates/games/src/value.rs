//! Tabular value functions.
//!
//! - [`LocalQFunction`]: `q̃_i[s, a_i]`, one player's Q over its own actions
//! - [`QFunction`]: `Q_i[s, a]` over joint actions
//! - [`VFunction`]: `V_i[s]`
//!
//! plus `Joint*` wrappers holding one table per player.

use serde::{Deserialize, Serialize};

use crate::{ActionId, GameError, PlayerId, Policy, StateId, StochasticGame};

/// One player's Q-table over its own actions, row-major `[s][a_i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalQFunction {
    player: PlayerId,
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl LocalQFunction {
    pub fn zeros(player: PlayerId, n_states: usize, n_actions: usize) -> Self {
        Self {
            player,
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        }
    }

    pub fn from_fn<F>(player: PlayerId, n_states: usize, n_actions: usize, mut f: F) -> Self
    where
        F: FnMut(StateId, ActionId) -> f64,
    {
        let mut values = Vec::with_capacity(n_states * n_actions);
        for s in 0..n_states {
            for a in 0..n_actions {
                values.push(f(StateId(s), ActionId(a)));
            }
        }
        Self {
            player,
            n_states,
            n_actions,
            values,
        }
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

    /// `q̃[s, a_i]`, or `None` outside the table.
    pub fn value(&self, state: StateId, action: ActionId) -> Option<f64> {
        if state.index() >= self.n_states || action.index() >= self.n_actions {
            return None;
        }
        Some(self.values[state.index() * self.n_actions + action.index()])
    }

    pub fn set_value(
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
        self.values[state.index() * self.n_actions + action.index()] = value;
        Ok(())
    }

    /// `q̃[s, ·]`. Panics if `state` is outside the table.
    pub fn row(&self, state: StateId) -> &[f64] {
        let start = state.index() * self.n_actions;
        &self.values[start..start + self.n_actions]
    }

    /// Mutable `q̃[s, ·]`. Panics if `state` is outside the table.
    pub fn row_mut(&mut self, state: StateId) -> &mut [f64] {
        let start = state.index() * self.n_actions;
        &mut self.values[start..start + self.n_actions]
    }

    /// `Σ_a π(a|s) · q̃[s, a]`.
    pub fn expected_value(&self, state: StateId, policy: &Policy) -> Result<f64, GameError> {
        if state.index() >= self.n_states {
            return Err(GameError::UnknownState { state });
        }
        if policy.n_actions() != self.n_actions {
            return Err(GameError::ShapeMismatch {
                component: "policy actions",
                expected: self.n_actions,
                got: policy.n_actions(),
            });
        }
        Ok(self
            .row(state)
            .iter()
            .zip(policy.row(state))
            .map(|(q, p)| q * p)
            .sum())
    }

    pub fn l1_distance(&self, other: &LocalQFunction) -> Result<f64, GameError> {
        if self.values.len() != other.values.len() {
            return Err(GameError::ShapeMismatch {
                component: "local Q-function",
                expected: self.values.len(),
                got: other.values.len(),
            });
        }
        Ok(quantal_prob::l1_distance(&self.values, &other.values)?)
    }
}

/// Local Q-tables of every player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointLocalQFunction {
    tables: Vec<LocalQFunction>,
}

impl JointLocalQFunction {
    pub fn new(mut tables: Vec<LocalQFunction>) -> Self {
        tables.sort_by_key(|q| q.player);
        Self { tables }
    }

    /// All-zero tables sized for `game`.
    pub fn zeros(game: &StochasticGame) -> Self {
        let n_states = game.num_states();
        Self {
            tables: game
                .actions()
                .action_sets()
                .iter()
                .map(|set| LocalQFunction::zeros(set.player(), n_states, set.len()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalQFunction> {
        self.tables.iter()
    }

    pub fn get(&self, player: PlayerId) -> Result<&LocalQFunction, GameError> {
        self.tables
            .iter()
            .find(|q| q.player == player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Result<&mut LocalQFunction, GameError> {
        self.tables
            .iter_mut()
            .find(|q| q.player == player)
            .ok_or(GameError::UnknownPlayer { player })
    }
}

/// One player's Q-table over joint actions, row-major `[s][a]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QFunction {
    player: PlayerId,
    n_states: usize,
    n_profiles: usize,
    values: Vec<f64>,
}

impl QFunction {
    pub fn zeros(player: PlayerId, n_states: usize, n_profiles: usize) -> Self {
        Self {
            player,
            n_states,
            n_profiles,
            values: vec![0.0; n_states * n_profiles],
        }
    }

    /// One-step lookahead of a value function:
    /// `Q_i(s, a) = R_i(s, a) + δ Σ_{s'} P(s' | s, a) V(s')`.
    pub fn lookahead(
        game: &StochasticGame,
        player: PlayerId,
        v: &VFunction,
    ) -> Result<Self, GameError> {
        if v.len() != game.num_states() {
            return Err(GameError::ShapeMismatch {
                component: "value function",
                expected: game.num_states(),
                got: v.len(),
            });
        }
        let n_profiles = game.actions().len();
        let mut q = Self::zeros(player, game.num_states(), n_profiles);
        for s in game.states().ids() {
            for a in 0..n_profiles {
                let continuation: f64 = game
                    .transition_row_by_index(s, a)?
                    .iter()
                    .zip(v.values())
                    .map(|(p, v)| p * v)
                    .sum();
                q.values[s.index() * n_profiles + a] =
                    game.reward_by_index(player, s, a)? + game.discount() * continuation;
            }
        }
        Ok(q)
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// `Q[s, a]` with the joint action given by its index.
    pub fn value(&self, state: StateId, profile: usize) -> Option<f64> {
        if state.index() >= self.n_states || profile >= self.n_profiles {
            return None;
        }
        Some(self.values[state.index() * self.n_profiles + profile])
    }

    /// `Q[s, ·]`. Panics if `state` is outside the table.
    pub fn row(&self, state: StateId) -> &[f64] {
        let start = state.index() * self.n_profiles;
        &self.values[start..start + self.n_profiles]
    }
}

/// One player's state-value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VFunction {
    player: PlayerId,
    values: Vec<f64>,
}

impl VFunction {
    pub fn new(player: PlayerId, values: Vec<f64>) -> Self {
        Self { player, values }
    }

    pub fn zeros(player: PlayerId, n_states: usize) -> Self {
        Self::new(player, vec![0.0; n_states])
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, state: StateId) -> Option<f64> {
        self.values.get(state.index()).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn l1_distance(&self, other: &VFunction) -> Result<f64, GameError> {
        if self.values.len() != other.values.len() {
            return Err(GameError::ShapeMismatch {
                component: "value function",
                expected: self.values.len(),
                got: other.values.len(),
            });
        }
        Ok(quantal_prob::l1_distance(&self.values, &other.values)?)
    }

    /// `max_s |V(s) − V'(s)|`.
    pub fn sup_distance(&self, other: &VFunction) -> Result<f64, GameError> {
        if self.values.len() != other.values.len() {
            return Err(GameError::ShapeMismatch {
                component: "value function",
                expected: self.values.len(),
                got: other.values.len(),
            });
        }
        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}

/// Joint-action Q-tables of every player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointQFunction {
    tables: Vec<QFunction>,
}

impl JointQFunction {
    pub fn new(mut tables: Vec<QFunction>) -> Self {
        tables.sort_by_key(|q| q.player);
        Self { tables }
    }

    pub fn get(&self, player: PlayerId) -> Result<&QFunction, GameError> {
        self.tables
            .iter()
            .find(|q| q.player == player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub fn iter(&self) -> impl Iterator<Item = &QFunction> {
        self.tables.iter()
    }
}

/// State-value tables of every player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointVFunction {
    tables: Vec<VFunction>,
}

impl JointVFunction {
    pub fn new(mut tables: Vec<VFunction>) -> Self {
        tables.sort_by_key(|v| v.player);
        Self { tables }
    }

    pub fn get(&self, player: PlayerId) -> Result<&VFunction, GameError> {
        self.tables
            .iter()
            .find(|v| v.player == player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub fn iter(&self) -> impl Iterator<Item = &VFunction> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionProfileSet, ActionSet, GameBuilder};

    #[test]
    fn test_local_q_set_and_row() {
        let mut q = LocalQFunction::zeros(PlayerId(0), 2, 3);
        q.set_value(StateId(1), ActionId(2), 4.5).unwrap();
        assert_eq!(q.row(StateId(1)), &[0.0, 0.0, 4.5]);
        assert_eq!(q.value(StateId(0), ActionId(2)), Some(0.0));
        assert_eq!(q.value(StateId(2), ActionId(0)), None);
        assert!(matches!(
            q.set_value(StateId(0), ActionId(3), 1.0),
            Err(GameError::UnknownAction { action: 3, .. })
        ));
    }

    #[test]
    fn test_expected_value_under_policy() {
        let q = LocalQFunction::from_fn(PlayerId(0), 1, 2, |_, a| {
            if a.index() == 0 {
                2.0
            } else {
                6.0
            }
        });
        let policy = Policy::from_fn(PlayerId(0), 1, 2, |_, a| {
            if a.index() == 0 {
                0.75
            } else {
                0.25
            }
        });
        assert!((q.expected_value(StateId(0), &policy).unwrap() - 3.0).abs() < 1e-12);

        let wrong = Policy::uniform(PlayerId(0), 1, 3);
        assert!(q.expected_value(StateId(0), &wrong).is_err());
    }

    #[test]
    fn test_lookahead_single_state() {
        // One player, one state, rewards 1 and 3, self-loop, δ = 0.5
        let mut builder = GameBuilder::new();
        let p = builder.add_player("p");
        builder.add_action(p, 0, None).unwrap();
        builder.add_action(p, 1, None).unwrap();
        builder.add_state(vec![0], None).unwrap();
        let game = builder
            .build(
                |_| 1.0,
                |_, _, _| 1.0,
                |_, _, a| if a[PlayerId(0)] == ActionId(0) { 1.0 } else { 3.0 },
                0.5,
            )
            .unwrap();

        let v = VFunction::new(p, vec![6.0]);
        let q = QFunction::lookahead(&game, p, &v).unwrap();
        assert_eq!(q.row(StateId(0)), &[4.0, 6.0]);
        assert!(QFunction::lookahead(&game, p, &VFunction::zeros(p, 2)).is_err());
    }

    #[test]
    fn test_joint_local_q_zeros_shape() {
        let mut builder = GameBuilder::new();
        let a = builder.add_player("a");
        let b = builder.add_player("b");
        builder.add_action(a, 0, None).unwrap();
        for v in 0..3 {
            builder.add_action(b, v, None).unwrap();
        }
        builder.add_state(vec![0], None).unwrap();
        builder.add_state(vec![1], None).unwrap();
        let game = builder
            .build(|_| 0.5, |s, _, n| if s.id == n.id { 1.0 } else { 0.0 }, |_, _, _| 0.0, 0.9)
            .unwrap();

        let q = JointLocalQFunction::zeros(&game);
        assert_eq!(q.len(), 2);
        assert_eq!(q.get(b).unwrap().n_actions(), 3);
        assert_eq!(q.get(a).unwrap().n_states(), 2);
        assert!(q.get(PlayerId(2)).is_err());

        let space = ActionProfileSet::new(vec![
            ActionSet::range(PlayerId(0), 1),
            ActionSet::range(PlayerId(1), 3),
        ])
        .unwrap();
        assert_eq!(game.actions(), &space);
    }

    #[test]
    fn test_v_distances() {
        let a = VFunction::new(PlayerId(0), vec![1.0, -2.0]);
        let b = VFunction::new(PlayerId(0), vec![0.0, 1.0]);
        assert!((a.l1_distance(&b).unwrap() - 4.0).abs() < 1e-12);
        assert!((a.sup_distance(&b).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_v_distances_reject_mismatched_lengths() {
        let a = VFunction::new(PlayerId(0), vec![1.0, -2.0]);
        let short = VFunction::new(PlayerId(0), vec![1.0]);
        let mismatch = GameError::ShapeMismatch {
            component: "value function",
            expected: 2,
            got: 1,
        };
        assert_eq!(a.sup_distance(&short), Err(mismatch.clone()));
        assert_eq!(a.l1_distance(&short), Err(mismatch));
    }
}
