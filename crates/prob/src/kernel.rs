//! Markov kernels (stochastic maps) between finite sets.

use crate::error::ProbError;
use crate::linalg;
use crate::PROB_TOLERANCE;

/// A Markov kernel (stochastic map) from a finite set X to a finite set Y.
///
/// Represented as a row-stochastic matrix where:
/// - `k[i][j]` = P(output = j | input = i)
/// - Each row sums to 1
///
/// Square kernels are the transition matrices of Markov chains; the benchmark
/// solver produces one per (player, policy profile) and evaluates it with
/// [`Kernel::evaluate`].
///
/// # Example
///
/// ```rust
/// use quantal_prob::Kernel;
///
/// // Weather: Sunny=0, Rainy=1
/// let weather = Kernel::new(vec![
///     vec![0.8, 0.2],
///     vec![0.4, 0.6],
/// ]).unwrap();
///
/// assert_eq!(weather.row(0), Some(&[0.8, 0.2][..]));
/// assert!((weather.conditional(1, 1).unwrap() - 0.6).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Row-stochastic matrix: `k[i][j]` = P(output=j | input=i)
    pub k: Vec<Vec<f64>>,
    /// Number of input states
    pub n_inputs: usize,
    /// Number of output states
    pub n_outputs: usize,
}

impl Kernel {
    /// Create a new kernel from a row-stochastic matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The matrix is empty
    /// - Rows have different lengths
    /// - Any entry is negative or non-finite
    /// - Any row doesn't sum to 1 (within tolerance)
    pub fn new(k: Vec<Vec<f64>>) -> Result<Self, ProbError> {
        if k.is_empty() {
            return Err(ProbError::EmptyKernel);
        }

        let n_inputs = k.len();
        let n_outputs = k[0].len();

        if n_outputs == 0 {
            return Err(ProbError::EmptyKernel);
        }

        for (i, row) in k.iter().enumerate() {
            if row.len() != n_outputs {
                return Err(ProbError::RaggedMatrix);
            }
            if let Some(&value) = row.iter().find(|x| !x.is_finite()) {
                return Err(ProbError::NonFinite { value });
            }
            if row.iter().any(|&x| x < -PROB_TOLERANCE) {
                return Err(ProbError::NegativeProbability);
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > PROB_TOLERANCE {
                return Err(ProbError::RowNotNormalized { row: i, sum });
            }
        }

        Ok(Self {
            k,
            n_inputs,
            n_outputs,
        })
    }

    /// Whether the kernel maps a set to itself.
    pub fn is_square(&self) -> bool {
        self.n_inputs == self.n_outputs
    }

    /// Row `i` of the matrix, `P(· | input = i)`.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.k.get(i).map(Vec::as_slice)
    }

    /// Get a specific conditional probability P(output=j | input=i).
    pub fn conditional(&self, input: usize, output: usize) -> Result<f64, ProbError> {
        if input >= self.n_inputs {
            return Err(ProbError::IndexOutOfBounds {
                index: input,
                size: self.n_inputs,
            });
        }
        if output >= self.n_outputs {
            return Err(ProbError::IndexOutOfBounds {
                index: output,
                size: self.n_outputs,
            });
        }
        Ok(self.k[input][output])
    }

    /// Discounted value of a Markov reward process on this chain.
    ///
    /// Solves `V = r + δ·K·V`, i.e. `V = (I − δK)⁻¹ r`.
    ///
    /// For `0 ≤ δ < 1` the matrix `I − δK` is strictly diagonally dominant, so
    /// the solve succeeds for every row-stochastic `K`.
    ///
    /// ```rust
    /// use quantal_prob::Kernel;
    ///
    /// // Self-loop paying 1 per step: V = 1 / (1 - 0.5) = 2
    /// let chain = Kernel::new(vec![vec![1.0]]).unwrap();
    /// let v = chain.evaluate(&[1.0], 0.5).unwrap();
    /// assert!((v[0] - 2.0).abs() < 1e-12);
    /// ```
    pub fn evaluate(&self, rewards: &[f64], discount: f64) -> Result<Vec<f64>, ProbError> {
        if !self.is_square() {
            return Err(ProbError::ShapeMismatch {
                expected: self.n_inputs,
                got: self.n_outputs,
            });
        }
        if rewards.len() != self.n_inputs {
            return Err(ProbError::ShapeMismatch {
                expected: self.n_inputs,
                got: rewards.len(),
            });
        }

        let system: Vec<Vec<f64>> = self
            .k
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &kij)| {
                        let id = if i == j { 1.0 } else { 0.0 };
                        id - discount * kij
                    })
                    .collect()
            })
            .collect();

        linalg::solve(system, rewards.to_vec())
    }
}
