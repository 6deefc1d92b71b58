//! World dynamics: the transition kernel and the initial-state distribution.
//!
//! ```text
//!            ┌──────────────┐
//!  (s, a) ──▶│  P(· | s, a) │──▶ s'
//!            └──────────────┘
//! ```
//!
//! Both are dense tables validated at construction, so a game that was built
//! successfully never samples from an unnormalized row.

use std::collections::HashMap;

use quantal_prob::{categorical, Dist, PROB_TOLERANCE};
use rand::Rng;

use crate::{ActionProfile, ActionProfileSet, GameError, State, StateId, StateSet};

/// Dense transition kernel over (state, joint action, next state).
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionKernel {
    n_states: usize,
    profiles: ActionProfileSet,
    /// `probs[(s · |A| + a) · |S| + s']`
    probs: Vec<f64>,
}

impl TransitionKernel {
    /// Tabulate `f(s, a, s')` for every triple and validate each row.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidTransitionProbability`] for a negative or non-finite entry
    /// - [`GameError::TransitionRowNotNormalized`] if some `P(· | s, a)` does not sum to 1
    pub fn from_fn<F>(
        states: &StateSet,
        profiles: &ActionProfileSet,
        mut f: F,
    ) -> Result<Self, GameError>
    where
        F: FnMut(&State, &ActionProfile, &State) -> f64,
    {
        let mut probs = Vec::with_capacity(states.len() * profiles.len() * states.len());
        for s in states.iter() {
            for a in profiles.iter() {
                for next in states.iter() {
                    probs.push(f(s, &a, next));
                }
            }
        }
        Self::from_dense(states.len(), profiles.clone(), probs)
    }

    /// Wrap an already tabulated kernel, laid out `[s][a][s']`.
    pub fn from_dense(
        n_states: usize,
        profiles: ActionProfileSet,
        probs: Vec<f64>,
    ) -> Result<Self, GameError> {
        let expected = n_states * profiles.len() * n_states;
        if probs.len() != expected {
            return Err(GameError::ShapeMismatch {
                component: "transition kernel",
                expected,
                got: probs.len(),
            });
        }

        let kernel = Self {
            n_states,
            profiles,
            probs,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    fn validate(&self) -> Result<(), GameError> {
        for s in 0..self.n_states {
            for a in 0..self.profiles.len() {
                let row = self.row_slice(s, a);
                if let Some(&value) = row
                    .iter()
                    .find(|x| !x.is_finite() || **x < -PROB_TOLERANCE)
                {
                    return Err(GameError::InvalidTransitionProbability {
                        state: StateId(s),
                        profile: a,
                        value,
                    });
                }
                let sum: f64 = row.iter().sum();
                if (sum - 1.0).abs() > PROB_TOLERANCE {
                    return Err(GameError::TransitionRowNotNormalized {
                        state: StateId(s),
                        profile: a,
                        sum,
                    });
                }
            }
        }
        Ok(())
    }

    fn row_slice(&self, s: usize, a: usize) -> &[f64] {
        let start = (s * self.profiles.len() + a) * self.n_states;
        &self.probs[start..start + self.n_states]
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn profiles(&self) -> &ActionProfileSet {
        &self.profiles
    }

    /// `P(· | s, a)` addressed by joint-action index.
    pub fn row_by_index(&self, state: StateId, profile: usize) -> Result<&[f64], GameError> {
        if state.index() >= self.n_states {
            return Err(GameError::UnknownState { state });
        }
        if profile >= self.profiles.len() {
            return Err(GameError::ShapeMismatch {
                component: "joint action index",
                expected: self.profiles.len(),
                got: profile,
            });
        }
        Ok(self.row_slice(state.index(), profile))
    }

    /// `P(· | s, a)`.
    pub fn row(&self, state: StateId, profile: &ActionProfile) -> Result<&[f64], GameError> {
        let index = self.profiles.index_of(profile)?;
        self.row_by_index(state, index)
    }

    /// `P(s' | s, a)`.
    pub fn prob(
        &self,
        state: StateId,
        profile: &ActionProfile,
        next: StateId,
    ) -> Result<f64, GameError> {
        self.row(state, profile)?
            .get(next.index())
            .copied()
            .ok_or(GameError::UnknownState { state: next })
    }

    /// Draw `s' ~ P(· | s, a)`.
    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        state: StateId,
        profile: &ActionProfile,
        rng: &mut R,
    ) -> Result<StateId, GameError> {
        let row = self.row(state, profile)?;
        Ok(StateId(categorical(row, rng)?))
    }

    /// Largest deviation of any row sum from 1.
    pub fn max_row_error(&self) -> f64 {
        self.probs
            .chunks(self.n_states.max(1))
            .map(|row| (row.iter().sum::<f64>() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

/// Distribution μ of the first state.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialStateDistribution {
    dist: Dist,
}

impl InitialStateDistribution {
    /// Tabulate `f(s)` for every state; the values must form a distribution.
    pub fn from_fn<F>(states: &StateSet, f: F) -> Result<Self, GameError>
    where
        F: FnMut(&State) -> f64,
    {
        let p: Vec<f64> = states.iter().map(f).collect();
        let dist = Dist::new(p).map_err(GameError::InitialDistribution)?;
        Ok(Self { dist })
    }

    /// Every state equally likely.
    pub fn uniform(states: &StateSet) -> Result<Self, GameError> {
        if states.is_empty() {
            return Err(GameError::NoStates);
        }
        Ok(Self {
            dist: Dist::uniform(states.len()),
        })
    }

    /// From an explicit table; every state must be present.
    pub fn from_table(
        states: &StateSet,
        table: &HashMap<StateId, f64>,
    ) -> Result<Self, GameError> {
        let p = states
            .ids()
            .map(|s| {
                table
                    .get(&s)
                    .copied()
                    .ok_or(GameError::MissingInitialProbability { state: s })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let dist = Dist::new(p).map_err(GameError::InitialDistribution)?;
        Ok(Self { dist })
    }

    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    /// `μ(s)`.
    pub fn prob(&self, state: StateId) -> Result<f64, GameError> {
        self.dist
            .p
            .get(state.index())
            .copied()
            .ok_or(GameError::UnknownState { state })
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.dist.p
    }

    /// Draw `s₀ ~ μ`.
    pub fn sample_initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<StateId, GameError> {
        Ok(StateId(categorical(&self.dist.p, rng)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionId, ActionSet, PlayerId};
    use quantal_prob::ProbError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn single_player(n_actions: usize) -> ActionProfileSet {
        ActionProfileSet::new(vec![ActionSet::range(PlayerId(0), n_actions)]).unwrap()
    }

    #[test]
    fn test_kernel_from_fn_rows_sum_to_one() {
        let states = StateSet::range(3);
        let profiles = single_player(2);
        // Action 0 stays, action 1 moves right (wrapping)
        let kernel = TransitionKernel::from_fn(&states, &profiles, |s, a, next| {
            let target = if a.actions()[0] == ActionId(0) {
                s.value[0]
            } else {
                (s.value[0] + 1) % 3
            };
            if next.value[0] == target {
                1.0
            } else {
                0.0
            }
        })
        .unwrap();

        assert!(kernel.max_row_error() < 1e-12);
        let right = ActionProfile::new(vec![ActionId(1)]);
        assert_eq!(kernel.prob(StateId(2), &right, StateId(0)).unwrap(), 1.0);
    }

    #[test]
    fn test_kernel_rejects_unnormalized_row() {
        let states = StateSet::range(2);
        let profiles = single_player(1);
        let result = TransitionKernel::from_fn(&states, &profiles, |_, _, _| 0.4);
        assert!(matches!(
            result,
            Err(GameError::TransitionRowNotNormalized { profile: 0, .. })
        ));
    }

    #[test]
    fn test_kernel_rejects_negative_entry() {
        let states = StateSet::range(2);
        let profiles = single_player(1);
        let result = TransitionKernel::from_fn(&states, &profiles, |_, _, next| {
            if next.id == StateId(0) {
                1.5
            } else {
                -0.5
            }
        });
        assert!(matches!(
            result,
            Err(GameError::InvalidTransitionProbability { .. })
        ));
    }

    #[test]
    fn test_kernel_dense_shape_mismatch() {
        let result = TransitionKernel::from_dense(2, single_player(2), vec![1.0; 3]);
        assert!(matches!(result, Err(GameError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_sample_next_state_follows_support() {
        let states = StateSet::range(3);
        let profiles = single_player(1);
        let kernel = TransitionKernel::from_fn(&states, &profiles, |_, _, next| {
            if next.id == StateId(2) {
                1.0
            } else {
                0.0
            }
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = ActionProfile::new(vec![ActionId(0)]);
        for _ in 0..50 {
            assert_eq!(
                kernel.sample_next_state(StateId(0), &a, &mut rng).unwrap(),
                StateId(2)
            );
        }
    }

    #[test]
    fn test_initial_distribution_validation() {
        let states = StateSet::range(2);
        let bad = InitialStateDistribution::from_fn(&states, |_| 0.3);
        assert!(matches!(
            bad,
            Err(GameError::InitialDistribution(ProbError::NotNormalized { .. }))
        ));

        let mut table = HashMap::new();
        table.insert(StateId(0), 1.0);
        assert_eq!(
            InitialStateDistribution::from_table(&states, &table),
            Err(GameError::MissingInitialProbability { state: StateId(1) })
        );
        table.insert(StateId(1), 0.0);
        let mu = InitialStateDistribution::from_table(&states, &table).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(mu.sample_initial_state(&mut rng).unwrap(), StateId(0));
    }

    #[test]
    fn test_uniform_initial_distribution() {
        let mu = InitialStateDistribution::uniform(&StateSet::range(4)).unwrap();
        assert_eq!(mu.prob(StateId(3)).unwrap(), 0.25);
        assert!(InitialStateDistribution::uniform(&StateSet::range(0)).is_err());
    }
}
