//! Routing congestion scenario.
//!
//! `N` players each pick one of `M` routes. The state records a safe/unsafe
//! status per route, so `|S| = 2^M`. A player on route `r` receives
//!
//! ```text
//!   b[r] − c · m[r] · load(r)        c = 1 if route r is unsafe, 2 if safe
//! ```
//!
//! Route statuses evolve independently: a route whose load reaches the
//! congestion threshold `U` is pressured and stays or becomes safe with
//! probability `λ₂`; otherwise with probability `λ₁`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{ActionProfile, GameBuilder, GameError, StochasticGame};

/// Route status value in a state tuple.
pub const SAFE: i64 = 0;
/// Route status value in a state tuple.
pub const UNSAFE: i64 = 1;

const SLOPE_RANGE: (u32, u32) = (1, 5);
const INTERCEPT_RANGE: (u32, u32) = (5, 20);

/// Parameters of a routing game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingGame {
    /// Number of players `N`.
    pub n_players: usize,
    /// Number of routes `M`.
    pub n_routes: usize,
    /// Congestion threshold `U`: a route with at least this many users is pressured.
    pub threshold: usize,
    /// Cost slopes `m[r]`; drawn from `seed` when absent.
    pub slopes: Option<Vec<f64>>,
    /// Reward intercepts `b[r]`; drawn from `seed` when absent.
    pub intercepts: Option<Vec<f64>>,
    /// `λ₁`: probability a non-pressured route is safe next round.
    pub safe_prob: f64,
    /// `λ₂`: probability a pressured route is safe next round.
    pub pressured_safe_prob: f64,
    pub discount: f64,
    /// Every player receives the mean of all players' rewards.
    pub common_interest: bool,
    /// Route pressure follows the current status instead of the joint action.
    pub strategy_independent: bool,
    pub seed: u64,
}

impl Default for RoutingGame {
    fn default() -> Self {
        Self {
            n_players: 4,
            n_routes: 2,
            threshold: 2,
            slopes: None,
            intercepts: None,
            safe_prob: 0.8,
            pressured_safe_prob: 0.2,
            discount: 0.5,
            common_interest: false,
            strategy_independent: false,
            seed: 100,
        }
    }
}

impl RoutingGame {
    pub fn new(n_players: usize, n_routes: usize, threshold: usize) -> Self {
        Self {
            n_players,
            n_routes,
            threshold,
            ..Self::default()
        }
    }

    pub fn with_slopes(mut self, slopes: Vec<f64>) -> Self {
        self.slopes = Some(slopes);
        self
    }

    pub fn with_intercepts(mut self, intercepts: Vec<f64>) -> Self {
        self.intercepts = Some(intercepts);
        self
    }

    pub fn with_transition_probs(mut self, safe_prob: f64, pressured_safe_prob: f64) -> Self {
        self.safe_prob = safe_prob;
        self.pressured_safe_prob = pressured_safe_prob;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_common_interest(mut self, common_interest: bool) -> Self {
        self.common_interest = common_interest;
        self
    }

    pub fn with_strategy_independent(mut self, strategy_independent: bool) -> Self {
        self.strategy_independent = strategy_independent;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The slopes and intercepts the game will use: the configured ones, or
    /// integer draws from `[1, 5]` and `[5, 20]` seeded by `seed`.
    pub fn coefficients(&self) -> (Vec<f64>, Vec<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let slopes = match &self.slopes {
            Some(m) => m.clone(),
            None => draw(&mut rng, self.n_routes, SLOPE_RANGE),
        };
        let intercepts = match &self.intercepts {
            Some(b) => b.clone(),
            None => draw(&mut rng, self.n_routes, INTERCEPT_RANGE),
        };
        (slopes, intercepts)
    }

    /// `2^M`, rejecting route counts whose `|S|·|A|·|S|` table would not fit in `usize`.
    fn state_count(&self) -> Result<usize, GameError> {
        let too_many = GameError::InvalidParameter {
            parameter: "n_routes",
            value: self.n_routes as f64,
        };
        let n_states = u32::try_from(self.n_routes)
            .ok()
            .and_then(|m| 1usize.checked_shl(m))
            .ok_or_else(|| too_many.clone())?;
        let n_players = u32::try_from(self.n_players).map_err(|_| too_many.clone())?;
        self.n_routes
            .checked_pow(n_players)
            .and_then(|profiles| profiles.checked_mul(n_states))
            .and_then(|cells| cells.checked_mul(n_states))
            .ok_or(too_many)?;
        Ok(n_states)
    }

    fn validate(&self, slopes: &[f64], intercepts: &[f64]) -> Result<(), GameError> {
        if self.n_players == 0 {
            return Err(GameError::NoPlayers);
        }
        if self.threshold == 0 {
            return Err(GameError::InvalidParameter {
                parameter: "threshold",
                value: 0.0,
            });
        }
        for (parameter, p) in [
            ("safe_prob", self.safe_prob),
            ("pressured_safe_prob", self.pressured_safe_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GameError::InvalidParameter {
                    parameter,
                    value: p,
                });
            }
        }
        for (component, coefficients) in [("slopes", slopes), ("intercepts", intercepts)] {
            if coefficients.len() != self.n_routes {
                return Err(GameError::ShapeMismatch {
                    component,
                    expected: self.n_routes,
                    got: coefficients.len(),
                });
            }
        }
        Ok(())
    }

    /// Build the stochastic game.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoPlayers`] / [`GameError::NoActions`] for zero players or routes
    /// - [`GameError::InvalidParameter`] for a zero threshold, a probability outside [0, 1],
    ///   or more routes than the dense tables can index
    /// - [`GameError::ShapeMismatch`] if slopes or intercepts are not one per route
    /// - whatever [`StochasticGame::new`] rejects (e.g. the discount)
    pub fn build(&self) -> Result<StochasticGame, GameError> {
        if self.n_players == 0 {
            return Err(GameError::NoPlayers);
        }
        let n_states = self.state_count()?;
        let (slopes, intercepts) = self.coefficients();
        self.validate(&slopes, &intercepts)?;
        log::debug!(
            "routing game: N={} M={} U={} m={:?} b={:?}",
            self.n_players,
            self.n_routes,
            self.threshold,
            slopes,
            intercepts
        );

        let mut builder = GameBuilder::new();
        for i in 0..self.n_players {
            let player = builder.add_player((i + 1).to_string());
            for route in 0..self.n_routes {
                builder.add_action(player, route as i64, None)?;
            }
        }
        // Status tuples in lexicographic order, first route most significant
        for code in 0..n_states {
            let value = (0..self.n_routes)
                .map(|r| ((code >> (self.n_routes - 1 - r)) & 1) as i64)
                .collect();
            builder.add_state(value, None)?;
        }

        let n_routes = self.n_routes;
        let loads = |a: &ActionProfile| {
            let mut loads = vec![0usize; n_routes];
            for action in a.actions() {
                loads[action.index()] += 1;
            }
            loads
        };
        let stage_reward = |route: usize, status: i64, load: usize| {
            let c = if status == UNSAFE { 1.0 } else { 2.0 };
            intercepts[route] - c * slopes[route] * load as f64
        };

        let uniform = 1.0 / n_states as f64;
        builder.build(
            |_| uniform,
            |s, a, next| {
                let load = loads(a);
                (0..n_routes)
                    .map(|r| {
                        let pressured = if self.strategy_independent {
                            s.value[r] == UNSAFE
                        } else {
                            load[r] >= self.threshold
                        };
                        let safe = if pressured {
                            self.pressured_safe_prob
                        } else {
                            self.safe_prob
                        };
                        if next.value[r] == SAFE {
                            safe
                        } else {
                            1.0 - safe
                        }
                    })
                    .product::<f64>()
            },
            |i, s, a| {
                let load = loads(a);
                if self.common_interest {
                    let total: f64 = a
                        .actions()
                        .iter()
                        .map(|route| {
                            let r = route.index();
                            stage_reward(r, s.value[r], load[r])
                        })
                        .sum();
                    total / a.len() as f64
                } else {
                    let r = a[i.id].index();
                    stage_reward(r, s.value[r], load[r])
                }
            },
            self.discount,
        )
    }
}

fn draw(rng: &mut impl Rng, n: usize, (low, high): (u32, u32)) -> Vec<f64> {
    (0..n).map(|_| f64::from(rng.random_range(low..=high))).collect()
}
