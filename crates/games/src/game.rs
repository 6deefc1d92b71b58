//! The stochastic game `G = (I, S, A, μ, P, R, δ)`.
//!
//! A [`StochasticGame`] is immutable once built: learners and solvers borrow
//! it and keep their own mutable state.

use rand::Rng;

use crate::{
    ActionId, ActionProfile, ActionProfileSet, ActionSet, GameError,
    InitialStateDistribution, Player, PlayerId, PlayerSet, RewardFunction, State, StateId,
    StateSet, TransitionKernel,
};

/// A finite discounted stochastic game.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticGame {
    players: PlayerSet,
    states: StateSet,
    actions: ActionProfileSet,
    initial: InitialStateDistribution,
    transition: TransitionKernel,
    rewards: RewardFunction,
    discount: f64,
}

impl StochasticGame {
    /// Assemble a game from its components.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoPlayers`] / [`GameError::NoStates`] for empty sets
    /// - [`GameError::InvalidDiscount`] unless `0 ≤ δ < 1`
    /// - [`GameError::ShapeMismatch`] if a component was built for other sets
    pub fn new(
        players: PlayerSet,
        states: StateSet,
        actions: ActionProfileSet,
        initial: InitialStateDistribution,
        transition: TransitionKernel,
        rewards: RewardFunction,
        discount: f64,
    ) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if states.is_empty() {
            return Err(GameError::NoStates);
        }
        if !discount.is_finite() || !(0.0..1.0).contains(&discount) {
            return Err(GameError::InvalidDiscount { discount });
        }

        check_shape("action sets", players.len(), actions.num_players())?;
        check_shape("initial distribution", states.len(), initial.len())?;
        check_shape("transition states", states.len(), transition.n_states())?;
        check_shape(
            "transition joint actions",
            actions.len(),
            transition.profiles().len(),
        )?;
        check_shape("reward players", players.len(), rewards.n_players())?;
        check_shape("reward states", states.len(), rewards.n_states())?;
        check_shape("reward joint actions", actions.len(), rewards.n_profiles())?;

        log::debug!(
            "built game: {} players, {} states, {} joint actions, discount {}",
            players.len(),
            states.len(),
            actions.len(),
            discount
        );

        Ok(Self {
            players,
            states,
            actions,
            initial,
            transition,
            rewards,
            discount,
        })
    }

    pub fn players(&self) -> &PlayerSet {
        &self.players
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    /// The joint action space.
    pub fn actions(&self) -> &ActionProfileSet {
        &self.actions
    }

    pub fn initial(&self) -> &InitialStateDistribution {
        &self.initial
    }

    pub fn transition(&self) -> &TransitionKernel {
        &self.transition
    }

    pub fn rewards(&self) -> &RewardFunction {
        &self.rewards
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// `|Aᵢ|`.
    pub fn num_actions(&self, player: PlayerId) -> Result<usize, GameError> {
        Ok(self.actions.action_set(player)?.len())
    }

    pub fn action_set(&self, player: PlayerId) -> Result<&ActionSet, GameError> {
        self.actions.action_set(player)
    }

    /// `R_i(s, a)`.
    pub fn reward(
        &self,
        player: PlayerId,
        state: StateId,
        profile: &ActionProfile,
    ) -> Result<f64, GameError> {
        self.rewards.reward(&self.actions, player, state, profile)
    }

    /// `R_i(s, a)` with the joint action given by its index.
    pub fn reward_by_index(
        &self,
        player: PlayerId,
        state: StateId,
        profile: usize,
    ) -> Result<f64, GameError> {
        self.rewards.reward_by_index(player, state, profile)
    }

    /// `P(s' | s, a)`.
    pub fn transition_prob(
        &self,
        state: StateId,
        profile: &ActionProfile,
        next: StateId,
    ) -> Result<f64, GameError> {
        self.transition.prob(state, profile, next)
    }

    /// `P(· | s, a)` with the joint action given by its index.
    pub fn transition_row_by_index(
        &self,
        state: StateId,
        profile: usize,
    ) -> Result<&[f64], GameError> {
        self.transition.row_by_index(state, profile)
    }

    pub fn sample_initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<StateId, GameError> {
        self.initial.sample_initial_state(rng)
    }

    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        state: StateId,
        profile: &ActionProfile,
        rng: &mut R,
    ) -> Result<StateId, GameError> {
        self.transition.sample_next_state(state, profile, rng)
    }
}

fn check_shape(component: &'static str, expected: usize, got: usize) -> Result<(), GameError> {
    if expected == got {
        Ok(())
    } else {
        Err(GameError::ShapeMismatch {
            component,
            expected,
            got,
        })
    }
}

/// Registration arena for games described entity by entity.
///
/// Ids are handed out in registration order; the dynamics are then given as
/// closures over the registered entities.
///
/// ```rust
/// use quantal_games::{GameBuilder, PlayerId, StateId};
///
/// let mut builder = GameBuilder::new();
/// let p = builder.add_player("solo");
/// builder.add_action(p, 0, Some("stay")).unwrap();
/// builder.add_action(p, 1, Some("go")).unwrap();
/// let s = builder.add_state(vec![0], None).unwrap();
///
/// let game = builder
///     .build(|_| 1.0, |_, _, _| 1.0, |_, _, a| a[PlayerId(0)].index() as f64, 0.9)
///     .unwrap();
/// assert_eq!(game.num_actions(p).unwrap(), 2);
/// assert_eq!(s, StateId(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameBuilder {
    players: Vec<Player>,
    actions: Vec<ActionSet>,
    states: StateSet,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player.
    pub fn add_player(&mut self, label: impl Into<String>) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.players.push(Player {
            id,
            label: Some(label.into()),
        });
        self.actions.push(ActionSet::empty(id));
        id
    }

    /// Register an action for an already registered player.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownPlayer`] for an unregistered player,
    /// [`GameError::DuplicateAction`] if the player already has this value.
    pub fn add_action(
        &mut self,
        player: PlayerId,
        value: i64,
        label: Option<&str>,
    ) -> Result<ActionId, GameError> {
        self.actions
            .get_mut(player.index())
            .ok_or(GameError::UnknownPlayer { player })?
            .push(value, label.map(str::to_string))
    }

    /// Register a state.
    ///
    /// # Errors
    ///
    /// [`GameError::DuplicateState`] if a state with this value exists.
    pub fn add_state(
        &mut self,
        value: Vec<i64>,
        label: Option<&str>,
    ) -> Result<StateId, GameError> {
        self.states.push(value, label.map(str::to_string))
    }

    /// Tabulate the dynamics over the registered entities and validate the game.
    pub fn build<I, T, W>(
        self,
        initial: I,
        transition: T,
        reward: W,
        discount: f64,
    ) -> Result<StochasticGame, GameError>
    where
        I: FnMut(&State) -> f64,
        T: FnMut(&State, &ActionProfile, &State) -> f64,
        W: FnMut(&Player, &State, &ActionProfile) -> f64,
    {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if self.states.is_empty() {
            return Err(GameError::NoStates);
        }

        let actions = ActionProfileSet::new(self.actions)?;
        let players = PlayerSet::from_players(self.players);
        let states = self.states;

        let mu = InitialStateDistribution::from_fn(&states, initial)?;
        let p = TransitionKernel::from_fn(&states, &actions, transition)?;
        let r = RewardFunction::from_fn(&players, &states, &actions, reward)?;

        StochasticGame::new(players, states, actions, mu, p, r, discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_loop(discount: f64) -> Result<StochasticGame, GameError> {
        let players = PlayerSet::anonymous(2);
        let states = StateSet::range(1);
        let actions = ActionProfileSet::new(vec![
            ActionSet::range(PlayerId(0), 2),
            ActionSet::range(PlayerId(1), 2),
        ])?;
        let mu = InitialStateDistribution::uniform(&states)?;
        let p = TransitionKernel::from_fn(&states, &actions, |_, _, _| 1.0)?;
        let r = RewardFunction::from_fn(&players, &states, &actions, |_, _, _| 0.0)?;
        StochasticGame::new(players, states, actions, mu, p, r, discount)
    }

    #[test]
    fn test_discount_bounds() {
        assert!(self_loop(0.0).is_ok());
        assert!(self_loop(0.99).is_ok());
        for bad in [1.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                self_loop(bad),
                Err(GameError::InvalidDiscount { .. })
            ));
        }
    }

    #[test]
    fn test_shape_mismatch_between_components() {
        let players = PlayerSet::anonymous(1);
        let states = StateSet::range(2);
        let actions = ActionProfileSet::new(vec![ActionSet::range(PlayerId(0), 2)]).unwrap();
        let mu = InitialStateDistribution::uniform(&states).unwrap();
        let p = TransitionKernel::from_fn(&states, &actions, |s, _, next| {
            if s.id == next.id {
                1.0
            } else {
                0.0
            }
        })
        .unwrap();
        // Reward built for a single state
        let r = RewardFunction::from_fn(&players, &StateSet::range(1), &actions, |_, _, _| 1.0)
            .unwrap();

        let result = StochasticGame::new(players, states, actions, mu, p, r, 0.5);
        assert_eq!(
            result,
            Err(GameError::ShapeMismatch {
                component: "reward states",
                expected: 2,
                got: 1,
            })
        );
    }

    #[test]
    fn test_builder_rejects_action_for_unknown_player() {
        let mut builder = GameBuilder::new();
        builder.add_player("a");
        assert_eq!(
            builder.add_action(PlayerId(1), 0, None),
            Err(GameError::UnknownPlayer { player: PlayerId(1) })
        );
    }

    #[test]
    fn test_builder_requires_actions() {
        let mut builder = GameBuilder::new();
        let a = builder.add_player("a");
        builder.add_player("b");
        builder.add_action(a, 0, None).unwrap();
        builder.add_state(vec![0], None).unwrap();
        let result = builder.build(|_| 1.0, |_, _, _| 1.0, |_, _, _| 0.0, 0.5);
        assert_eq!(result, Err(GameError::NoActions { player: PlayerId(1) }));
    }

    #[test]
    fn test_builder_rejects_repeated_values() {
        let mut builder = GameBuilder::new();
        let a = builder.add_player("a");
        let b = builder.add_player("b");
        assert_eq!(builder.add_action(a, 0, None), Ok(ActionId(0)));
        assert_eq!(
            builder.add_action(a, 0, Some("again")),
            Err(GameError::DuplicateAction { player: a, value: 0 })
        );
        // Values are per player
        assert_eq!(builder.add_action(b, 0, None), Ok(ActionId(0)));
        assert_eq!(builder.add_state(vec![7], None), Ok(StateId(0)));
        assert_eq!(
            builder.add_state(vec![7], Some("copy")),
            Err(GameError::DuplicateState { value: vec![7] })
        );

        let game = builder
            .build(|_| 1.0, |_, _, _| 1.0, |_, _, _| 0.0, 0.5)
            .unwrap();
        assert_eq!(game.num_states(), 1);
        assert_eq!(game.actions().len(), 1);
    }

    #[test]
    fn test_builder_requires_states() {
        let mut builder = GameBuilder::new();
        let a = builder.add_player("a");
        builder.add_action(a, 0, None).unwrap();
        let result = builder.build(|_| 1.0, |_, _, _| 1.0, |_, _, _| 0.0, 0.5);
        assert_eq!(result, Err(GameError::NoStates));
    }

    #[test]
    fn test_game_queries() {
        let game = self_loop(0.5).unwrap();
        let a = ActionProfile::new(vec![ActionId(1), ActionId(0)]);
        assert_eq!(game.transition_prob(StateId(0), &a, StateId(0)).unwrap(), 1.0);
        assert_eq!(game.reward(PlayerId(1), StateId(0), &a).unwrap(), 0.0);
        assert_eq!(game.num_actions(PlayerId(0)).unwrap(), 2);
        assert!(game.num_actions(PlayerId(2)).is_err());
    }
}
