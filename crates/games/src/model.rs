//! Players and states.
//!
//! Identity is the registration index: a [`PlayerId`] or [`StateId`] is the
//! position of the entity in its set, and every table in this crate is a dense
//! array indexed by these ids. Labels are for display only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GameError;

/// Registration index of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

/// Registration index of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub usize);

/// Index of an action within its player's action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub usize);

impl PlayerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decision maker in the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub label: Option<String>,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A game state. The value may be a tuple (e.g. one status per route);
/// scalar states are one-element tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub value: Vec<i64>,
    pub label: Option<String>,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None if self.value.len() == 1 => write!(f, "{}", self.value[0]),
            None => write!(f, "{:?}", self.value),
        }
    }
}

/// The ordered set of players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSet {
    players: Vec<Player>,
}

impl PlayerSet {
    /// Create `n` unlabeled players with ids `0..n`.
    pub fn anonymous(n: usize) -> Self {
        Self {
            players: (0..n)
                .map(|i| Player {
                    id: PlayerId(i),
                    label: None,
                })
                .collect(),
        }
    }

    /// Create players from labels, assigning ids in order.
    pub fn labeled<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            players: labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| Player {
                    id: PlayerId(i),
                    label: Some(label.into()),
                })
                .collect(),
        }
    }

    pub(crate) fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn get(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(id.index())
            .ok_or(GameError::UnknownPlayer { player: id })
    }
}

/// The ordered set of states, unique by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSet {
    states: Vec<State>,
}

impl StateSet {
    /// Create states from values, assigning ids in order.
    ///
    /// # Errors
    ///
    /// [`GameError::DuplicateState`] if a value appears twice.
    pub fn from_values(values: impl IntoIterator<Item = Vec<i64>>) -> Result<Self, GameError> {
        let mut set = Self { states: Vec::new() };
        for value in values {
            set.push(value, None)?;
        }
        Ok(set)
    }

    /// Create `n` scalar states with values `0..n`.
    pub fn range(n: usize) -> Self {
        Self {
            states: (0..n)
                .map(|i| State {
                    id: StateId(i),
                    value: vec![i as i64],
                    label: None,
                })
                .collect(),
        }
    }

    /// Append a state with a fresh id, refusing a value already present.
    pub(crate) fn push(
        &mut self,
        value: Vec<i64>,
        label: Option<String>,
    ) -> Result<StateId, GameError> {
        if self.find(&value).is_some() {
            return Err(GameError::DuplicateState { value });
        }
        let id = StateId(self.states.len());
        self.states.push(State { id, value, label });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().map(|s| s.id)
    }

    pub fn get(&self, id: StateId) -> Result<&State, GameError> {
        self.states
            .get(id.index())
            .ok_or(GameError::UnknownState { state: id })
    }

    /// Look up a state by its value.
    pub fn find(&self, value: &[i64]) -> Option<&State> {
        self.states.iter().find(|s| s.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_display_prefers_label() {
        let players = PlayerSet::labeled(["alice", "bob"]);
        assert_eq!(players.get(PlayerId(1)).unwrap().to_string(), "bob");
        assert_eq!(PlayerSet::anonymous(2).get(PlayerId(0)).unwrap().to_string(), "0");
    }

    #[test]
    fn test_unknown_ids() {
        let players = PlayerSet::anonymous(1);
        assert_eq!(
            players.get(PlayerId(3)),
            Err(GameError::UnknownPlayer { player: PlayerId(3) })
        );
        let states = StateSet::range(2);
        assert!(states.get(StateId(2)).is_err());
    }

    #[test]
    fn test_tuple_states() {
        let states =
            StateSet::from_values(vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]).unwrap();
        assert_eq!(states.len(), 4);
        assert_eq!(states.find(&[1, 0]).unwrap().id, StateId(2));
        assert_eq!(states.get(StateId(1)).unwrap().to_string(), "[0, 1]");
    }

    #[test]
    fn test_ids_are_ordered_by_registration() {
        let ids: Vec<_> = StateSet::range(3).ids().collect();
        assert_eq!(ids, vec![StateId(0), StateId(1), StateId(2)]);
        assert!(StateId(0) < StateId(2));
    }

    #[test]
    fn test_duplicate_state_values_rejected() {
        assert_eq!(
            StateSet::from_values(vec![vec![0, 1], vec![1, 0], vec![0, 1]]),
            Err(GameError::DuplicateState { value: vec![0, 1] })
        );
        let mut states = StateSet::range(2);
        assert_eq!(
            states.push(vec![1], None),
            Err(GameError::DuplicateState { value: vec![1] })
        );
        assert_eq!(states.push(vec![2], None), Ok(StateId(2)));
        assert_eq!(states.find(&[2]).unwrap().id, StateId(2));
    }
}
