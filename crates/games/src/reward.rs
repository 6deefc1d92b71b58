//! Per-player stage rewards `R_i(s, a)`.

use std::collections::HashMap;

use crate::{
    ActionProfile, ActionProfileSet, GameError, Player, PlayerId, PlayerSet, State, StateId,
    StateSet,
};

/// Dense reward table over (player, state, joint action).
#[derive(Debug, Clone, PartialEq)]
pub struct RewardFunction {
    n_players: usize,
    n_states: usize,
    n_profiles: usize,
    /// `values[(i · |S| + s) · |A| + a]`
    values: Vec<f64>,
}

impl RewardFunction {
    /// Tabulate `f(i, s, a)` for every player, state and joint action.
    pub fn from_fn<F>(
        players: &PlayerSet,
        states: &StateSet,
        profiles: &ActionProfileSet,
        mut f: F,
    ) -> Result<Self, GameError>
    where
        F: FnMut(&Player, &State, &ActionProfile) -> f64,
    {
        let mut values = Vec::with_capacity(players.len() * states.len() * profiles.len());
        for i in players.iter() {
            for s in states.iter() {
                for a in profiles.iter() {
                    values.push(f(i, s, &a));
                }
            }
        }
        Self::from_dense(players.len(), states.len(), profiles.len(), values)
    }

    /// Look every entry up in an explicit table.
    ///
    /// # Errors
    ///
    /// [`GameError::MissingReward`] names the first (player, state, joint action)
    /// without an entry.
    pub fn from_table(
        players: &PlayerSet,
        states: &StateSet,
        profiles: &ActionProfileSet,
        table: &HashMap<(PlayerId, StateId, ActionProfile), f64>,
    ) -> Result<Self, GameError> {
        let mut values = Vec::with_capacity(players.len() * states.len() * profiles.len());
        for i in players.ids() {
            for s in states.ids() {
                for (index, a) in profiles.iter().enumerate() {
                    let value = table.get(&(i, s, a)).copied().ok_or(GameError::MissingReward {
                        player: i,
                        state: s,
                        profile: index,
                    })?;
                    values.push(value);
                }
            }
        }
        Self::from_dense(players.len(), states.len(), profiles.len(), values)
    }

    /// Wrap an already tabulated reward, laid out `[i][s][a]`.
    pub fn from_dense(
        n_players: usize,
        n_states: usize,
        n_profiles: usize,
        values: Vec<f64>,
    ) -> Result<Self, GameError> {
        let expected = n_players * n_states * n_profiles;
        if values.len() != expected {
            return Err(GameError::ShapeMismatch {
                component: "reward function",
                expected,
                got: values.len(),
            });
        }
        if let Some((pos, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            let profile = pos % n_profiles;
            let rest = pos / n_profiles;
            return Err(GameError::NonFiniteReward {
                player: PlayerId(rest / n_states),
                state: StateId(rest % n_states),
                profile,
                value,
            });
        }
        Ok(Self {
            n_players,
            n_states,
            n_profiles,
            values,
        })
    }

    pub fn n_players(&self) -> usize {
        self.n_players
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_profiles(&self) -> usize {
        self.n_profiles
    }

    /// `R_i(s, a)` with the joint action given by its index.
    pub fn reward_by_index(
        &self,
        player: PlayerId,
        state: StateId,
        profile: usize,
    ) -> Result<f64, GameError> {
        if player.index() >= self.n_players {
            return Err(GameError::UnknownPlayer { player });
        }
        if state.index() >= self.n_states {
            return Err(GameError::UnknownState { state });
        }
        if profile >= self.n_profiles {
            return Err(GameError::ShapeMismatch {
                component: "joint action index",
                expected: self.n_profiles,
                got: profile,
            });
        }
        let row = player.index() * self.n_states + state.index();
        Ok(self.values[row * self.n_profiles + profile])
    }

    /// `R_i(s, a)`.
    pub fn reward(
        &self,
        profiles: &ActionProfileSet,
        player: PlayerId,
        state: StateId,
        profile: &ActionProfile,
    ) -> Result<f64, GameError> {
        self.reward_by_index(player, state, profiles.index_of(profile)?)
    }
}
