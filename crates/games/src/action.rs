//! Actions, joint actions (profiles) and the joint action space.
//!
//! # Joint Action Encoding
//!
//! The joint action space is the Cartesian product of every player's action
//! set. It is never materialized: a profile's position in the product is its
//! mixed-radix code, with player 0 as the most significant digit, so the order
//! matches a nested loop over players.
//!
//! ```text
//!   sizes    = [2, 3]            (player 0 has 2 actions, player 1 has 3)
//!   strides  = [3, 1]
//!   (a₀, a₁) ↦ 3·a₀ + a₁         (1, 2) ↦ 5
//! ```
//!
//! Removing one player ([`ActionProfile::minus`]) leaves an [`OpponentProfile`];
//! putting a candidate action back ([`ActionProfile::merge`]) enumerates a
//! player's unilateral deviations against fixed opponents.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{ActionId, GameError, PlayerId};

/// An action available to one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub player: PlayerId,
    pub id: ActionId,
    pub value: i64,
    pub label: Option<String>,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "{}", self.value),
        }
    }
}

/// The ordered actions of one player, unique by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    player: PlayerId,
    actions: Vec<Action>,
}

impl ActionSet {
    /// Create an action set from values, assigning ids in order.
    ///
    /// # Errors
    ///
    /// [`GameError::DuplicateAction`] if a value appears twice.
    pub fn new(player: PlayerId, values: impl IntoIterator<Item = i64>) -> Result<Self, GameError> {
        let mut set = Self::empty(player);
        for value in values {
            set.push(value, None)?;
        }
        Ok(set)
    }

    /// `n` actions with values `0..n`.
    pub fn range(player: PlayerId, n: usize) -> Self {
        Self {
            player,
            actions: (0..n)
                .map(|i| Action {
                    player,
                    id: ActionId(i),
                    value: i as i64,
                    label: None,
                })
                .collect(),
        }
    }

    pub(crate) fn empty(player: PlayerId) -> Self {
        Self {
            player,
            actions: Vec::new(),
        }
    }

    /// Append an action with a fresh id, refusing a value already present.
    pub(crate) fn push(
        &mut self,
        value: i64,
        label: Option<String>,
    ) -> Result<ActionId, GameError> {
        if self.find(value).is_some() {
            return Err(GameError::DuplicateAction {
                player: self.player,
                value,
            });
        }
        let id = ActionId(self.actions.len());
        self.actions.push(Action {
            player: self.player,
            id,
            value,
            label,
        });
        Ok(id)
    }

    /// Look up an action by its value.
    pub fn find(&self, value: i64) -> Option<&Action> {
        self.actions.iter().find(|a| a.value == value)
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().map(|a| a.id)
    }

    pub fn get(&self, id: ActionId) -> Result<&Action, GameError> {
        self.actions.get(id.index()).ok_or(GameError::UnknownAction {
            player: self.player,
            action: id.index(),
        })
    }
}

/// Read access to "which action does this player take", shared by complete
/// and opponents-only profiles.
pub trait ProfileView {
    /// The action of `player`, or `None` if the profile does not cover them.
    fn action_of(&self, player: PlayerId) -> Option<ActionId>;
}

/// One action per player, indexed by player id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionProfile {
    actions: Vec<ActionId>,
}

impl ActionProfile {
    /// `actions[i]` is the action of player `i`.
    pub fn new(actions: Vec<ActionId>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    pub fn get(&self, player: PlayerId) -> Option<ActionId> {
        self.actions.get(player.index()).copied()
    }

    /// The opponents' joint action: this profile without `player`.
    pub fn minus(&self, player: PlayerId) -> OpponentProfile {
        let actions = self
            .actions
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != player.index())
            .map(|(_, a)| *a)
            .collect();
        OpponentProfile {
            excluded: player,
            actions,
        }
    }

    /// Put `action` back into the excluded player's slot of `opponents`.
    ///
    /// `ActionProfile::merge(a[i], &a.minus(i)) == a` for every profile `a`.
    pub fn merge(action: ActionId, opponents: &OpponentProfile) -> ActionProfile {
        let mut actions = opponents.actions.clone();
        let at = opponents.excluded.index().min(actions.len());
        actions.insert(at, action);
        ActionProfile { actions }
    }
}

impl ProfileView for ActionProfile {
    fn action_of(&self, player: PlayerId) -> Option<ActionId> {
        self.get(player)
    }
}

impl Index<PlayerId> for ActionProfile {
    type Output = ActionId;

    fn index(&self, player: PlayerId) -> &ActionId {
        &self.actions[player.index()]
    }
}

impl fmt::Display for ActionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.actions.iter().map(|a| a.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// A joint action of every player except one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpponentProfile {
    excluded: PlayerId,
    /// Actions of the remaining players, in player order.
    actions: Vec<ActionId>,
}

impl OpponentProfile {
    pub fn excluded(&self) -> PlayerId {
        self.excluded
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// `(player, action)` pairs of the covered players.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, ActionId)> + '_ {
        let excluded = self.excluded.index();
        self.actions.iter().enumerate().map(move |(i, a)| {
            let player = if i < excluded { i } else { i + 1 };
            (PlayerId(player), *a)
        })
    }
}

impl ProfileView for OpponentProfile {
    fn action_of(&self, player: PlayerId) -> Option<ActionId> {
        let p = player.index();
        let excluded = self.excluded.index();
        if p == excluded {
            None
        } else if p < excluded {
            self.actions.get(p).copied()
        } else {
            self.actions.get(p - 1).copied()
        }
    }
}

/// The joint action space: every player's action set, with mixed-radix indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProfileSet {
    action_sets: Vec<ActionSet>,
    strides: Vec<usize>,
    len: usize,
}

impl ActionProfileSet {
    /// Build the joint action space. `action_sets[i]` must belong to player `i`.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoPlayers`] if `action_sets` is empty
    /// - [`GameError::NoActions`] if any player has no actions
    /// - [`GameError::UnknownPlayer`] if the sets are not ordered by player id
    /// - [`GameError::ActionSpaceOverflow`] if the product of the set sizes overflows `usize`
    pub fn new(action_sets: Vec<ActionSet>) -> Result<Self, GameError> {
        if action_sets.is_empty() {
            return Err(GameError::NoPlayers);
        }
        for (i, set) in action_sets.iter().enumerate() {
            if set.player != PlayerId(i) {
                return Err(GameError::UnknownPlayer { player: set.player });
            }
            if set.is_empty() {
                return Err(GameError::NoActions { player: set.player });
            }
        }

        let mut strides = vec![1usize; action_sets.len()];
        for i in (0..action_sets.len() - 1).rev() {
            strides[i] = strides[i + 1]
                .checked_mul(action_sets[i + 1].len())
                .ok_or(GameError::ActionSpaceOverflow)?;
        }
        let len = strides[0]
            .checked_mul(action_sets[0].len())
            .ok_or(GameError::ActionSpaceOverflow)?;

        Ok(Self {
            action_sets,
            strides,
            len,
        })
    }

    /// Number of joint actions.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_players(&self) -> usize {
        self.action_sets.len()
    }

    /// The action set of one player.
    pub fn action_set(&self, player: PlayerId) -> Result<&ActionSet, GameError> {
        self.action_sets
            .get(player.index())
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub fn action_sets(&self) -> &[ActionSet] {
        &self.action_sets
    }

    /// Position of a profile in the joint action space.
    pub fn index_of(&self, profile: &ActionProfile) -> Result<usize, GameError> {
        if profile.len() != self.num_players() {
            return Err(GameError::IncompleteProfile {
                player: PlayerId(profile.len().min(self.num_players())),
            });
        }
        let mut index = 0;
        for ((set, stride), action) in self
            .action_sets
            .iter()
            .zip(self.strides.iter())
            .zip(profile.actions.iter())
        {
            if action.index() >= set.len() {
                return Err(GameError::UnknownAction {
                    player: set.player,
                    action: action.index(),
                });
            }
            index += stride * action.index();
        }
        Ok(index)
    }

    /// The profile at a position, or `None` past the end.
    pub fn profile(&self, index: usize) -> Option<ActionProfile> {
        if index >= self.len {
            return None;
        }
        let actions = self
            .action_sets
            .iter()
            .zip(self.strides.iter())
            .map(|(set, stride)| ActionId((index / stride) % set.len()))
            .collect();
        Some(ActionProfile { actions })
    }

    /// All joint actions, in index order.
    pub fn iter(&self) -> impl Iterator<Item = ActionProfile> + '_ {
        (0..self.len).filter_map(move |i| self.profile(i))
    }

    /// The opponents' joint action space of `player`.
    pub fn minus(&self, player: PlayerId) -> OpponentProfileSet {
        let radices: Vec<usize> = self
            .action_sets
            .iter()
            .filter(|set| set.player != player)
            .map(|set| set.len())
            .collect();
        let len = radices.iter().product();
        OpponentProfileSet {
            excluded: player,
            radices,
            len,
        }
    }
}

impl Index<PlayerId> for ActionProfileSet {
    type Output = ActionSet;

    fn index(&self, player: PlayerId) -> &ActionSet {
        &self.action_sets[player.index()]
    }
}

/// Every joint action of one player's opponents.
#[derive(Debug, Clone)]
pub struct OpponentProfileSet {
    excluded: PlayerId,
    /// Action-set sizes of the remaining players, in player order.
    radices: Vec<usize>,
    len: usize,
}

impl OpponentProfileSet {
    pub fn excluded(&self) -> PlayerId {
        self.excluded
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All opponent profiles, last opponent varying fastest.
    pub fn iter(&self) -> impl Iterator<Item = OpponentProfile> + '_ {
        (0..self.len).map(move |mut code| {
            let mut actions = vec![ActionId(0); self.radices.len()];
            for (slot, radix) in actions.iter_mut().zip(self.radices.iter()).rev() {
                *slot = ActionId(code % radix);
                code /= radix;
            }
            OpponentProfile {
                excluded: self.excluded,
                actions,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> ActionProfileSet {
        ActionProfileSet::new(vec![
            ActionSet::range(PlayerId(0), 2),
            ActionSet::range(PlayerId(1), 3),
            ActionSet::range(PlayerId(2), 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_len_is_product() {
        assert_eq!(space().len(), 12);
        assert_eq!(space().minus(PlayerId(1)).len(), 4);
    }

    #[test]
    fn test_index_roundtrip_in_order() {
        let s = space();
        for (i, profile) in s.iter().enumerate() {
            assert_eq!(s.index_of(&profile).unwrap(), i);
        }
        // Last player varies fastest
        let first_two: Vec<_> = s.iter().take(2).collect();
        assert_eq!(first_two[1].actions(), &[ActionId(0), ActionId(0), ActionId(1)]);
    }

    #[test]
    fn test_minus_then_merge_restores_profile() {
        let s = space();
        for profile in s.iter() {
            for p in 0..3 {
                let player = PlayerId(p);
                let opponents = profile.minus(player);
                assert_eq!(opponents.action_of(player), None);
                assert_eq!(ActionProfile::merge(profile[player], &opponents), profile);
            }
        }
    }

    #[test]
    fn test_opponent_set_enumerates_distinct_profiles() {
        let s = space();
        let opponents: Vec<_> = s.minus(PlayerId(1)).iter().collect();
        assert_eq!(opponents.len(), 4);
        for (i, a) in opponents.iter().enumerate() {
            for b in opponents.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        let players: Vec<_> = opponents[3].iter().map(|(p, _)| p).collect();
        assert_eq!(players, vec![PlayerId(0), PlayerId(2)]);
    }

    #[test]
    fn test_merge_enumerates_deviations() {
        let s = space();
        let opponents = s.minus(PlayerId(2)).iter().nth(3).unwrap();
        let deviations: Vec<_> = s[PlayerId(2)]
            .ids()
            .map(|a| ActionProfile::merge(a, &opponents))
            .collect();
        assert_eq!(deviations.len(), 2);
        assert_eq!(deviations[0].minus(PlayerId(2)), opponents);
        assert_eq!(deviations[1][PlayerId(2)], ActionId(1));
    }

    #[test]
    fn test_index_of_rejects_bad_profiles() {
        let s = space();
        let short = ActionProfile::new(vec![ActionId(0)]);
        assert!(matches!(
            s.index_of(&short),
            Err(GameError::IncompleteProfile { .. })
        ));
        let out_of_range = ActionProfile::new(vec![ActionId(0), ActionId(3), ActionId(0)]);
        assert_eq!(
            s.index_of(&out_of_range),
            Err(GameError::UnknownAction {
                player: PlayerId(1),
                action: 3
            })
        );
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(ActionProfileSet::new(vec![]), Err(GameError::NoPlayers));
        assert_eq!(
            ActionProfileSet::new(vec![ActionSet::range(PlayerId(0), 0)]),
            Err(GameError::NoActions { player: PlayerId(0) })
        );
        assert_eq!(
            ActionProfileSet::new(vec![ActionSet::range(PlayerId(1), 2)]),
            Err(GameError::UnknownPlayer { player: PlayerId(1) })
        );
    }

    #[test]
    fn test_duplicate_action_values_rejected() {
        assert_eq!(
            ActionSet::new(PlayerId(0), vec![3, 5, 3]),
            Err(GameError::DuplicateAction {
                player: PlayerId(0),
                value: 3
            })
        );
        let set = ActionSet::new(PlayerId(1), vec![5, 3]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.find(3).unwrap().id, ActionId(1));
        assert!(set.find(4).is_none());
    }

    #[test]
    fn test_joint_space_overflow_is_an_error() {
        // 2^16 actions for each of 4 players: 2^64 joint actions
        let sets = (0..4)
            .map(|i| ActionSet::range(PlayerId(i), 1 << 16))
            .collect();
        assert_eq!(ActionProfileSet::new(sets), Err(GameError::ActionSpaceOverflow));
    }
}
