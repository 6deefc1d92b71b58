//! # Game Model Tests
//!
//! End-to-end checks of game construction:
//! - Validation failures surface as typed errors
//! - Sampled play stays inside the declared spaces
//! - The routing scenario is a well-formed game

use std::collections::HashMap;

use quantal_games::routing::RoutingGame;
use quantal_games::{
    ActionId, ActionProfile, ActionProfileSet, ActionSet, GameBuilder, GameError,
    InitialStateDistribution, JointPolicy, PlayerId, PlayerSet, RewardFunction, StateId,
    StateSet, StochasticGame, TransitionKernel,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn matching_pennies(discount: f64) -> Result<StochasticGame, GameError> {
    let mut builder = GameBuilder::new();
    let row = builder.add_player("row");
    let col = builder.add_player("col");
    for p in [row, col] {
        builder.add_action(p, 0, Some("heads"))?;
        builder.add_action(p, 1, Some("tails"))?;
    }
    builder.add_state(vec![0], Some("only")).unwrap();
    builder.build(
        |_| 1.0,
        |_, _, _| 1.0,
        |i, _, a| {
            let matched = a[PlayerId(0)] == a[PlayerId(1)];
            let row_payoff = if matched { 1.0 } else { -1.0 };
            if i.id == PlayerId(0) {
                row_payoff
            } else {
                -row_payoff
            }
        },
        discount,
    )
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_discount_must_be_below_one() {
    assert!(matching_pennies(0.0).is_ok());
    assert_eq!(
        matching_pennies(1.0),
        Err(GameError::InvalidDiscount { discount: 1.0 })
    );
}

#[test]
fn test_transition_rows_must_normalize() {
    let mut builder = GameBuilder::new();
    let p = builder.add_player("p");
    builder.add_action(p, 0, None).unwrap();
    builder.add_state(vec![0], None).unwrap();
    builder.add_state(vec![1], None).unwrap();
    let result = builder.build(|_| 0.5, |_, _, _| 0.25, |_, _, _| 0.0, 0.9);
    assert!(matches!(
        result,
        Err(GameError::TransitionRowNotNormalized { state: StateId(0), .. })
    ));
}

#[test]
fn test_initial_distribution_must_normalize() {
    let mut builder = GameBuilder::new();
    let p = builder.add_player("p");
    builder.add_action(p, 0, None).unwrap();
    builder.add_state(vec![0], None).unwrap();
    let result = builder.build(|_| 0.5, |_, _, _| 1.0, |_, _, _| 0.0, 0.9);
    assert!(matches!(result, Err(GameError::InitialDistribution(_))));
}

#[test]
fn test_explicit_tables() {
    let players = PlayerSet::anonymous(1);
    let states = StateSet::range(2);
    let actions = ActionProfileSet::new(vec![ActionSet::range(PlayerId(0), 2)]).unwrap();

    let mu_table: HashMap<StateId, f64> = [(StateId(0), 0.25), (StateId(1), 0.75)].into();
    let mu = InitialStateDistribution::from_table(&states, &mu_table).unwrap();

    let mut reward_table = HashMap::new();
    for s in states.ids() {
        for a in actions.iter() {
            let value = (s.index() * 10 + a[PlayerId(0)].index()) as f64;
            reward_table.insert((PlayerId(0), s, a), value);
        }
    }
    let rewards = RewardFunction::from_table(&players, &states, &actions, &reward_table).unwrap();
    let p = TransitionKernel::from_fn(&states, &actions, |_, a, next| {
        if next.id.index() == a[PlayerId(0)].index() {
            1.0
        } else {
            0.0
        }
    })
    .unwrap();

    let game = StochasticGame::new(players, states, actions, mu, p, rewards, 0.9).unwrap();
    let go = ActionProfile::new(vec![ActionId(1)]);
    assert_eq!(game.reward(PlayerId(0), StateId(1), &go).unwrap(), 11.0);
    assert_eq!(game.transition_prob(StateId(0), &go, StateId(1)).unwrap(), 1.0);
    assert_eq!(game.initial().prob(StateId(1)).unwrap(), 0.75);
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn test_sampled_play_stays_in_bounds() {
    let game = RoutingGame::new(3, 2, 2).with_seed(5).build().unwrap();
    let pi = JointPolicy::uniform(&game);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut s = game.sample_initial_state(&mut rng).unwrap();
    for _ in 0..200 {
        let a = pi.sample_joint_action(s, &mut rng).unwrap();
        assert_eq!(a.len(), 3);
        for i in game.players().ids() {
            assert!(a[i].index() < game.num_actions(i).unwrap());
            assert!(game.reward(i, s, &a).unwrap().is_finite());
        }
        s = game.sample_next_state(s, &a, &mut rng).unwrap();
        assert!(s.index() < game.num_states());
    }
}

#[test]
fn test_sampling_is_reproducible() {
    let game = matching_pennies(0.5).unwrap();
    let pi = JointPolicy::uniform(&game);
    let draw = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..32)
            .map(|_| pi.sample_joint_action(StateId(0), &mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(3), draw(3));
}

#[test]
fn test_zero_sum_rewards() {
    let game = matching_pennies(0.5).unwrap();
    for a in game.actions().iter() {
        let total: f64 = game
            .players()
            .ids()
            .map(|i| game.reward(i, StateId(0), &a).unwrap())
            .sum();
        assert_eq!(total, 0.0);
    }
}

// ============================================================================
// Routing scenario
// ============================================================================

#[test]
fn test_routing_game_is_well_formed() {
    let game = RoutingGame::default().build().unwrap();
    assert_eq!(game.num_players(), 4);
    assert_eq!(game.num_states(), 4);
    assert_eq!(game.actions().len(), 16);
    assert_eq!(game.discount(), 0.5);
    assert!(game.transition().max_row_error() < 1e-9);
    assert!((game.initial().prob(StateId(2)).unwrap() - 0.25).abs() < 1e-12);
    assert_eq!(game.players().get(PlayerId(0)).unwrap().to_string(), "1");
}
