//! Convergence metrics over a recorded run.
//!
//! Every metric is a sequence aligned with the history's snapshots, measured
//! against what the run ended at (or against an exact benchmark computed from
//! the final opponents).

use quantal_games::{PlayerId, StochasticGame, VFunction};

use crate::solver::{evaluate_policy, value_iteration};
use crate::{LearnError, LearningHistory};

fn check_history(history: &LearningHistory, player: PlayerId) -> Result<(), LearnError> {
    if history.is_empty() {
        return Err(LearnError::EmptyHistory);
    }
    if history.final_policy().policy(player).is_err() {
        return Err(LearnError::PlayerNotInHistory { player });
    }
    Ok(())
}

/// `‖π_i^k − π_i^K‖₁` for every snapshot k.
pub fn policy_distances(
    history: &LearningHistory,
    player: PlayerId,
) -> Result<Vec<f64>, LearnError> {
    check_history(history, player)?;
    let last = history.final_policy().policy(player)?;
    history
        .policies()
        .iter()
        .map(|joint| Ok(joint.policy(player)?.l1_distance(last)?))
        .collect()
}

/// `‖q̃_i^k − q̃_i^K‖₁` for every snapshot k.
pub fn q_distances(history: &LearningHistory, player: PlayerId) -> Result<Vec<f64>, LearnError> {
    check_history(history, player)?;
    let last = history
        .final_q()
        .get(player)
        .map_err(|_| LearnError::PlayerNotInHistory { player })?;
    history
        .q_functions()
        .iter()
        .map(|joint| Ok(joint.get(player)?.l1_distance(last)?))
        .collect()
}

/// `‖V_t − V_T‖₁` for every value-iteration iterate.
pub fn value_iteration_distances(iterates: &[VFunction]) -> Result<Vec<f64>, LearnError> {
    let last = iterates.last().ok_or(LearnError::EmptyHistory)?;
    iterates
        .iter()
        .map(|v| Ok(v.l1_distance(last)?))
        .collect()
}

/// Best-response gap `‖V_i(π_i^k, π_{-i}^K) − V_i*(π_{-i}^K)‖₁` per snapshot.
///
/// The opponents are frozen at their final policies; `V_i*` comes from
/// `iterations` backups of value iteration and each `V_i(π_i^k, ·)` from an
/// exact linear solve. Costs one `O(|S|³)` solve per snapshot, so thin the
/// history with a snapshot interval on long runs.
pub fn best_response_gaps(
    game: &StochasticGame,
    history: &LearningHistory,
    player: PlayerId,
    iterations: usize,
) -> Result<Vec<f64>, LearnError> {
    check_history(history, player)?;
    let opponents = history.final_policy().minus(player);
    let optimal = value_iteration(game, player, &opponents, iterations)?
        .pop()
        .ok_or(LearnError::EmptyHistory)?;

    log::debug!(
        "best-response gaps for player {} over {} snapshots",
        player,
        history.len()
    );

    history
        .policies()
        .iter()
        .map(|joint| {
            let v = evaluate_policy(game, player, joint.policy(player)?, &opponents)?;
            Ok(v.l1_distance(&optimal)?)
        })
        .collect()
}

/// Trailing mean over the last `window` entries (fewer at the start).
///
/// A window of 0 is treated as 1.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, x)| {
            sum += x;
            if i >= window {
                sum -= values[i - window];
            }
            sum / (i + 1).min(window) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndependentLearner, LearnerConfig};
    use quantal_games::routing::RoutingGame;
    use quantal_games::LocalQFunction;

    fn short_run(game: &StochasticGame) -> LearningHistory {
        let config = LearnerConfig::default()
            .with_rounds(200)
            .with_temperature(0.1)
            .with_seed(3);
        IndependentLearner::new(game, config).unwrap().run().unwrap()
    }

    #[test]
    fn test_moving_average() {
        let avg = moving_average(&[1.0, 3.0, 5.0, 7.0], 2);
        assert_eq!(avg, vec![1.0, 2.0, 4.0, 6.0]);
        assert_eq!(moving_average(&[2.0, 4.0], 0), vec![2.0, 4.0]);
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn test_distance_sequences_align_with_snapshots() {
        let game = RoutingGame::new(2, 2, 2).build().unwrap();
        let history = short_run(&game);
        for p in game.players().ids() {
            let d = policy_distances(&history, p).unwrap();
            assert_eq!(d.len(), history.len());
            assert!(d.iter().all(|x| *x >= 0.0 && x.is_finite()));
            let q = q_distances(&history, p).unwrap();
            assert_eq!(q.len(), history.len());
            // The first snapshot holds zero Q-tables
            let last = history.final_q().get(p).unwrap();
            let zero = LocalQFunction::zeros(p, last.n_states(), last.n_actions());
            assert_eq!(q[0], zero.l1_distance(last).unwrap());
        }
    }

    #[test]
    fn test_unknown_player_rejected() {
        let game = RoutingGame::new(2, 2, 2).build().unwrap();
        let history = short_run(&game);
        let ghost = PlayerId(7);
        assert_eq!(
            policy_distances(&history, ghost),
            Err(LearnError::PlayerNotInHistory { player: ghost })
        );
        assert_eq!(
            q_distances(&history, ghost),
            Err(LearnError::PlayerNotInHistory { player: ghost })
        );
    }

    #[test]
    fn test_value_iteration_distances() {
        let game = RoutingGame::new(2, 2, 2).build().unwrap();
        let history = short_run(&game);
        let opponents = history.final_policy().minus(PlayerId(0));
        let iterates = value_iteration(&game, PlayerId(0), &opponents, 30).unwrap();
        let d = value_iteration_distances(&iterates).unwrap();
        assert_eq!(d.len(), 31);
        assert_eq!(d[30], 0.0);
        assert!(d[0] > d[29]);
        assert_eq!(value_iteration_distances(&[]), Err(LearnError::EmptyHistory));
    }

    #[test]
    fn test_best_response_gaps_nonnegative() {
        let game = RoutingGame::new(2, 2, 2).build().unwrap();
        let history = short_run(&game);
        let gaps = best_response_gaps(&game, &history, PlayerId(1), 200).unwrap();
        assert_eq!(gaps.len(), history.len());
        // V* dominates every policy's value, so the gap is a sum of
        // nonnegative terms up to solver noise
        assert!(gaps.iter().all(|g| g.is_finite() && *g >= -1e-9));
    }
}
