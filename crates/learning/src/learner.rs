//! Independent decentralized learning with entropy-regularized Q-updates.
//!
//! Every player keeps its own policy `π_i` and local Q-table `q̃_i[s, a_i]`,
//! observes only the state, its own action and its own reward, and never sees
//! the other players' tables. One round at state `s`:
//!
//! ```text
//!   a ~ π(s)                    independent per player
//!   N[s] += 1, Ñ_i[s, a_i] += 1
//!   s' ~ P(s, a, ·)
//!   for every player i:
//!     ν_i      = Σ_a π_i(a|s) ln π_i(a|s)
//!     target   = R_i(s, a) − τ ν_i + δ Σ_a π_i(a|s) q̃_i[s, a]
//!     q̃_i[s, a_i] += α(Ñ_i[s, a_i]) · (target − q̃_i[s, a_i])
//!     π_i(·|s)   += β(N[s]) · (softmax(q̃_i[s, ·] / τ) − π_i(·|s))
//!   s ← s'
//! ```
//!
//! The Q target reads the tables as they were at the start of the round; the
//! policy target reads the freshly updated Q row.

use quantal_games::{
    ActionId, JointLocalQFunction, JointPolicy, LocalQFunction, PlayerId, StateId,
    StochasticGame,
};
use quantal_prob::{categorical, neg_entropy, softmax};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{LearnError, LearnerConfig, LearningHistory, Round, StepSize};

/// Runs the independent learning dynamics on a borrowed game.
pub struct IndependentLearner<'g, R = ChaCha8Rng> {
    game: &'g StochasticGame,
    config: LearnerConfig,
    alpha: Box<dyn StepSize + 'g>,
    beta: Box<dyn StepSize + 'g>,
    rng: R,
    policy: JointPolicy,
    q: JointLocalQFunction,
    state: StateId,
    round: usize,
    /// N[s]
    state_visits: Vec<u64>,
    /// Ñ_i[s, a_i], one row-major table per player
    action_visits: Vec<Vec<u64>>,
}

impl<'g> IndependentLearner<'g, ChaCha8Rng> {
    /// Learner driven by `ChaCha8Rng::seed_from_u64(config.seed)`.
    pub fn new(game: &'g StochasticGame, config: LearnerConfig) -> Result<Self, LearnError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(game, config, rng)
    }
}

impl<'g, R: Rng> IndependentLearner<'g, R> {
    /// Learner driven by a caller-supplied generator.
    ///
    /// Draws `s_0 ~ μ`, starts every player at the uniform policy and zero Q.
    pub fn with_rng(
        game: &'g StochasticGame,
        config: LearnerConfig,
        mut rng: R,
    ) -> Result<Self, LearnError> {
        config.validate()?;
        let state = game.sample_initial_state(&mut rng)?;
        let action_visits = game
            .actions()
            .action_sets()
            .iter()
            .map(|set| vec![0; game.num_states() * set.len()])
            .collect();

        Ok(Self {
            game,
            alpha: Box::new(config.alpha),
            beta: Box::new(config.beta),
            config,
            rng,
            policy: JointPolicy::uniform(game),
            q: JointLocalQFunction::zeros(game),
            state,
            round: 0,
            state_visits: vec![0; game.num_states()],
            action_visits,
        })
    }

    /// Replace the configured schedules with arbitrary step-size functions.
    ///
    /// `config().alpha` and `config().beta` keep describing the schedules the
    /// learner was created with; they no longer drive the updates.
    ///
    /// ```rust
    /// # use quantal_games::routing::RoutingGame;
    /// # use quantal_learning::{IndependentLearner, LearnerConfig};
    /// # let game = RoutingGame::new(2, 2, 2).build().unwrap();
    /// let learner = IndependentLearner::new(&game, LearnerConfig::default().with_rounds(10))
    ///     .unwrap()
    ///     .with_step_sizes(|n: u64| 1.0 / (n as f64).powf(0.6), |n: u64| 1.0 / n as f64);
    /// # let _ = learner;
    /// ```
    pub fn with_step_sizes<A, B>(mut self, alpha: A, beta: B) -> Self
    where
        A: StepSize + 'g,
        B: StepSize + 'g,
    {
        self.alpha = Box::new(alpha);
        self.beta = Box::new(beta);
        self
    }

    pub fn game(&self) -> &StochasticGame {
        self.game
    }

    /// The configuration the learner was created with. Step sizes installed
    /// by [`with_step_sizes`](Self::with_step_sizes) are not reflected here.
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Current joint policy π_k.
    pub fn policy(&self) -> &JointPolicy {
        &self.policy
    }

    /// Current local Q-tables q̃_k.
    pub fn q_functions(&self) -> &JointLocalQFunction {
        &self.q
    }

    /// Current state s_k.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Number of rounds played so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// N[s].
    pub fn state_visits(&self, state: StateId) -> u64 {
        self.state_visits.get(state.index()).copied().unwrap_or(0)
    }

    /// Ñ_i[s, a_i].
    pub fn action_visits(&self, player: PlayerId, state: StateId, action: ActionId) -> u64 {
        let Some(table) = self.action_visits.get(player.index()) else {
            return 0;
        };
        let n_actions = table.len() / self.game.num_states().max(1);
        if action.index() >= n_actions {
            return 0;
        }
        table
            .get(state.index() * n_actions + action.index())
            .copied()
            .unwrap_or(0)
    }

    /// Play one round and update the tables in place.
    pub fn step(&mut self) -> Result<Round, LearnError> {
        self.advance(None)
    }

    /// Play `config.rounds` rounds and return the recorded history.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run; the partial history is dropped.
    pub fn run(&mut self) -> Result<LearningHistory, LearnError> {
        let rounds = self.config.rounds;
        let progress_every = (rounds / 10).max(1);
        log::info!(
            "learning: {} rounds, tau={}, {} players, {} states",
            rounds,
            self.config.temperature,
            self.game.num_players(),
            self.game.num_states()
        );

        let mut history = LearningHistory::new(self.policy.clone(), self.q.clone());
        for k in 0..rounds {
            self.advance(Some(&mut history))?;
            if (k + 1) % progress_every == 0 {
                log::debug!("round {}/{} (state {})", k + 1, rounds, self.state);
            }
        }
        history.finish(self.policy.clone(), self.q.clone());

        log::info!(
            "learning finished after {} rounds, {} snapshots kept",
            self.round,
            history.len()
        );
        Ok(history)
    }

    fn advance(&mut self, history: Option<&mut LearningHistory>) -> Result<Round, LearnError> {
        let game = self.game;
        let s = self.state;
        let tau = self.config.temperature;

        let action = self.policy.sample_joint_action(s, &mut self.rng)?;
        let profile = game.actions().index_of(&action)?;

        let next_state = StateId(categorical(
            game.transition_row_by_index(s, profile)?,
            &mut self.rng,
        )?);

        // Everything fallible is settled before any table changes
        let state_count = self.state_visits[s.index()] + 1;
        let beta = checked_step(state_count, self.beta.step(state_count))?;
        let mut cells = Vec::with_capacity(action.len());
        let mut alphas = Vec::with_capacity(action.len());
        let mut rewards = Vec::with_capacity(action.len());
        for (i, visits) in self.action_visits.iter().enumerate() {
            let player = PlayerId(i);
            let n_actions = visits.len() / game.num_states();
            let cell = s.index() * n_actions + action[player].index();
            let count = visits[cell] + 1;
            cells.push(cell);
            alphas.push(checked_step(count, self.alpha.step(count))?);
            rewards.push(game.reward_by_index(player, s, profile)?);
        }

        if let Some(history) = history {
            if self.round % self.config.snapshot_interval == 0 {
                history.push(
                    self.round,
                    self.policy.clone(),
                    self.q.clone(),
                    s,
                    action.clone(),
                );
            }
        }

        self.state_visits[s.index()] = state_count;
        for (visits, &cell) in self.action_visits.iter_mut().zip(&cells) {
            visits[cell] += 1;
        }

        for (i, (&alpha, &reward)) in alphas.iter().zip(&rewards).enumerate() {
            let player = PlayerId(i);
            let q = self.q.get_mut(player)?;
            let pi = self.policy.policy_mut(player)?;

            update_q(
                q,
                pi.row(s),
                s,
                action[player].index(),
                reward,
                tau,
                game.discount(),
                alpha,
            );
            let target = softmax(q.row(s), tau)?;
            for (p, t) in pi.row_mut(s).iter_mut().zip(target.p.iter()) {
                *p += beta * (t - *p);
            }
        }

        log::trace!("round {}: {} --{}--> {}", self.round, s, action, next_state);

        let round = Round {
            index: self.round,
            state: s,
            action,
            next_state,
        };
        self.state = next_state;
        self.round += 1;
        Ok(round)
    }
}

/// Move `q̃[s, a]` toward the entropy-regularized one-step target computed
/// from the pre-update policy row and Q row.
#[allow(clippy::too_many_arguments)]
fn update_q(
    q: &mut LocalQFunction,
    pi_row: &[f64],
    s: StateId,
    a: usize,
    reward: f64,
    tau: f64,
    discount: f64,
    alpha: f64,
) {
    let nu = neg_entropy(pi_row);
    let row = q.row_mut(s);
    let expected: f64 = row.iter().zip(pi_row).map(|(q, p)| q * p).sum();
    let target = reward - tau * nu + discount * expected;
    row[a] += alpha * (target - row[a]);
}

fn checked_step(count: u64, value: f64) -> Result<f64, LearnError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(LearnError::InvalidStepSize { count, value })
    }
}
