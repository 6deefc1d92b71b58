//! # Prob - Finite Distributions and Markov Kernels
//!
//! The numeric substrate shared by the game model, the learning engine and
//! the benchmark solver:
//!
//! - **Distributions** ([`Dist`]): probability vectors over `{0, …, n-1}`
//! - **Categorical sampling** ([`categorical`]): weighted draws with an
//!   explicitly injected random source, so every run is reproducible from a seed
//! - **Soft best responses** ([`softmax`]): numerically stabilized softmax at a
//!   temperature τ, and the `x ln x` entropy regularizer ([`xlogx`])
//! - **Markov kernels** ([`Kernel`]): row-stochastic matrices, with discounted
//!   evaluation `V = (I − δK)⁻¹ r`
//!
//! ## Example: Policy Evaluation on a Two-State Chain
//!
//! ```rust
//! use quantal_prob::Kernel;
//!
//! let chain = Kernel::new(vec![
//!     vec![0.5, 0.5],
//!     vec![0.0, 1.0],
//! ]).unwrap();
//!
//! let v = chain.evaluate(&[1.0, 0.0], 0.5).unwrap();
//! // V(0) = 1 + 0.5 * 0.5 * V(0)  =>  V(0) = 4/3
//! assert!((v[0] - 4.0 / 3.0).abs() < 1e-12);
//! ```

mod dist;
mod error;
mod kernel;
pub mod linalg;

pub use dist::{categorical, l1_distance, neg_entropy, softmax, xlogx, Dist};
pub use error::ProbError;
pub use kernel::Kernel;

/// Tolerance for probability comparisons.
pub const PROB_TOLERANCE: f64 = 1e-6;
