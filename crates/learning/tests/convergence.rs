//! End-to-end learning runs checked against the diagnostics.

use quantal_games::routing::RoutingGame;
use quantal_games::{ActionId, GameBuilder, PlayerId, StateId, StochasticGame};
use quantal_learning::diagnostics::{best_response_gaps, moving_average, policy_distances};
use quantal_learning::{IndependentLearner, LearnerConfig, LearningHistory, Schedule};

/// One state, two players with two actions each, zero reward and a self-loop.
fn symmetric_game() -> StochasticGame {
    let mut builder = GameBuilder::new();
    for name in ["row", "column"] {
        let p = builder.add_player(name);
        builder.add_action(p, 0, None).unwrap();
        builder.add_action(p, 1, None).unwrap();
    }
    builder.add_state(vec![0], None).unwrap();
    builder
        .build(|_| 1.0, |_, _, _| 1.0, |_, _, _| 0.0, 0.5)
        .unwrap()
}

fn run(game: &StochasticGame, config: LearnerConfig) -> LearningHistory {
    IndependentLearner::new(game, config).unwrap().run().unwrap()
}

#[test]
fn test_symmetric_game_stays_uniform() {
    let game = symmetric_game();
    let config = LearnerConfig::default()
        .with_rounds(1000)
        .with_temperature(1e-3)
        .with_alpha(Schedule::sqrt_decay())
        .with_beta(Schedule::harmonic())
        .with_seed(42);
    let history = run(&game, config);
    assert_eq!(history.len(), 1000);

    for p in game.players().ids() {
        let pi = history.final_policy().policy(p).unwrap();
        for a in 0..2 {
            let prob = pi.prob(StateId(0), ActionId(a));
            assert!((prob - 0.5).abs() < 0.1, "player {} action {}: {}", p, a, prob);
        }

        let averaged = moving_average(&policy_distances(&history, p).unwrap(), 50);
        let tail = &averaged[averaged.len() / 2..];
        for pair in tail.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "drift grew: {:?}", pair);
        }
    }
}

#[test]
fn test_runs_are_reproducible_from_seed() {
    let game = RoutingGame::new(3, 2, 2).build().unwrap();
    let config = LearnerConfig::default()
        .with_rounds(300)
        .with_temperature(0.05)
        .with_seed(11);
    let first = run(&game, config.clone());
    let second = run(&game, config.clone());
    assert_eq!(first, second);

    let other = run(&game, config.with_seed(12));
    assert_ne!(first.states(), other.states());
}

#[test]
fn test_routing_run_is_well_formed() {
    let game = RoutingGame::new(2, 2, 2).build().unwrap();
    let config = LearnerConfig::default()
        .with_rounds(2000)
        .with_temperature(0.05)
        .with_seed(5)
        .with_snapshot_interval(100);
    let history = run(&game, config);
    assert_eq!(history.len(), 20);
    assert_eq!(history.rounds()[3], 300);

    for joint in history.policies() {
        for pi in joint.iter() {
            assert!(pi.is_normalized(1e-9));
        }
    }
    for s in history.states() {
        assert!(s.index() < game.num_states());
    }

    for p in game.players().ids() {
        let gaps = best_response_gaps(&game, &history, p, 500).unwrap();
        assert_eq!(gaps.len(), 20);
        assert!(gaps.iter().all(|g| g.is_finite() && *g >= -1e-9));
    }
}

#[test]
fn test_single_player_learns_the_better_action() {
    // One state, action 1 pays 1 more than action 0 every round
    let mut builder = GameBuilder::new();
    let p = builder.add_player("solo");
    builder.add_action(p, 0, None).unwrap();
    builder.add_action(p, 1, None).unwrap();
    builder.add_state(vec![0], None).unwrap();
    let game = builder
        .build(|_| 1.0, |_, _, _| 1.0, |_, _, a| a[PlayerId(0)].index() as f64, 0.5)
        .unwrap();

    let config = LearnerConfig::default()
        .with_rounds(3000)
        .with_temperature(0.1)
        .with_seed(1);
    let history = run(&game, config);
    let pi = history.final_policy().policy(PlayerId(0)).unwrap();
    assert!(pi.prob(StateId(0), ActionId(1)) > 0.9);
}
