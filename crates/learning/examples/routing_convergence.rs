//! Independent learning on the routing congestion game
//!
//! Run with: RUST_LOG=info cargo run -p quantal-learning --example routing_convergence
//!
//! Four drivers pick one of two routes each round. Heavy use makes a route
//! unsafe, and unsafe routes cost less per driver but stay congested. Every
//! driver learns alone from its own reward; the diagnostics then compare
//! what they learned against an exact best response to the others.

use quantal_games::routing::RoutingGame;
use quantal_games::StateId;
use quantal_learning::diagnostics::{
    best_response_gaps, moving_average, policy_distances, q_distances,
};
use quantal_learning::{IndependentLearner, LearnError, LearnerConfig, Schedule};

fn main() -> Result<(), LearnError> {
    env_logger::init();

    println!("=== Independent Learning: Routing Congestion ===\n");

    // -------------------------------------------------------------------------
    // 1. The game
    // -------------------------------------------------------------------------
    let scenario = RoutingGame::default();
    let game = scenario.build()?;
    let (slopes, intercepts) = scenario.coefficients();
    println!(
        "{} players, {} routes, {} states, {} joint actions, δ = {}",
        game.num_players(),
        scenario.n_routes,
        game.num_states(),
        game.actions().len(),
        game.discount()
    );
    println!("slopes     {:?}", slopes);
    println!("intercepts {:?}\n", intercepts);

    // -------------------------------------------------------------------------
    // 2. Learn
    // -------------------------------------------------------------------------
    let config = LearnerConfig::default()
        .with_rounds(20_000)
        .with_temperature(0.05)
        .with_alpha(Schedule::Power { exponent: 0.6 })
        .with_beta(Schedule::harmonic())
        .with_seed(2024)
        .with_snapshot_interval(500);
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("config:\n{}\n", json),
        Err(err) => log::warn!("could not render config: {}", err),
    }

    let history = IndependentLearner::new(&game, config)?.run()?;

    println!("Final policies in the all-safe state:");
    let all_safe = StateId(0);
    for pi in history.final_policy().iter() {
        let row: Vec<String> = pi.row(all_safe).iter().map(|p| format!("{:.3}", p)).collect();
        println!("  player {}: [{}]", pi.player(), row.join(", "));
    }
    println!();

    // -------------------------------------------------------------------------
    // 3. Diagnostics
    // -------------------------------------------------------------------------
    println!("{:>8} {:>12} {:>12} {:>12}", "player", "‖π−π_K‖₁", "‖q−q_K‖₁", "BR gap");
    for p in game.players().ids() {
        let drift = moving_average(&policy_distances(&history, p)?, 5);
        let q_drift = moving_average(&q_distances(&history, p)?, 5);
        let gaps = best_response_gaps(&game, &history, p, 2_000)?;
        let first = 0;
        let last = history.len() - 1;
        println!(
            "{:>8} {:>5.3}→{:<6.3} {:>5.2}→{:<6.2} {:>5.3}→{:<6.3}",
            p, drift[first], drift[last], q_drift[first], q_drift[last], gaps[first], gaps[last]
        );
    }

    Ok(())
}
