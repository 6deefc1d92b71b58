//! Records produced by a learning run.
//!
//! ```text
//!   round k:  (π_k, q̃_k, s_k, a_k)   snapshot taken before the update
//!             ──────────────────▶ (π_{k+1}, q̃_{k+1}, s_{k+1})
//! ```

use quantal_games::{ActionProfile, JointLocalQFunction, JointPolicy, StateId};
use serde::{Deserialize, Serialize};

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Zero-based round number k.
    pub index: usize,
    /// State s_k the round was played in.
    pub state: StateId,
    /// Joint action a_k that was played.
    pub action: ActionProfile,
    /// State s_{k+1} drawn from P(s_k, a_k, ·).
    pub next_state: StateId,
}

/// Parallel per-snapshot sequences plus the tables after the last round.
///
/// Entry `j` of every sequence belongs to the same round, `rounds()[j]`.
/// With a snapshot interval of 1 all sequences have one entry per round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningHistory {
    rounds: Vec<usize>,
    policies: Vec<JointPolicy>,
    q_functions: Vec<JointLocalQFunction>,
    states: Vec<StateId>,
    actions: Vec<ActionProfile>,
    final_policy: JointPolicy,
    final_q: JointLocalQFunction,
}

impl LearningHistory {
    pub(crate) fn new(initial_policy: JointPolicy, initial_q: JointLocalQFunction) -> Self {
        Self {
            rounds: Vec::new(),
            policies: Vec::new(),
            q_functions: Vec::new(),
            states: Vec::new(),
            actions: Vec::new(),
            final_policy: initial_policy,
            final_q: initial_q,
        }
    }

    pub(crate) fn push(
        &mut self,
        round: usize,
        policy: JointPolicy,
        q: JointLocalQFunction,
        state: StateId,
        action: ActionProfile,
    ) {
        self.rounds.push(round);
        self.policies.push(policy);
        self.q_functions.push(q);
        self.states.push(state);
        self.actions.push(action);
    }

    pub(crate) fn finish(&mut self, policy: JointPolicy, q: JointLocalQFunction) {
        self.final_policy = policy;
        self.final_q = q;
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Round number of each snapshot.
    pub fn rounds(&self) -> &[usize] {
        &self.rounds
    }

    /// π_k at each snapshot.
    pub fn policies(&self) -> &[JointPolicy] {
        &self.policies
    }

    /// q̃_k at each snapshot.
    pub fn q_functions(&self) -> &[JointLocalQFunction] {
        &self.q_functions
    }

    /// s_k at each snapshot.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// a_k at each snapshot.
    pub fn actions(&self) -> &[ActionProfile] {
        &self.actions
    }

    /// Joint policy after the last round.
    pub fn final_policy(&self) -> &JointPolicy {
        &self.final_policy
    }

    /// Local Q-tables after the last round.
    pub fn final_q(&self) -> &JointLocalQFunction {
        &self.final_q
    }
}
