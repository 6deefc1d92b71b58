//! Error types for probability operations.

use thiserror::Error;

/// Errors that can occur in probability computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// Distribution doesn't sum to 1.
    #[error("Distribution not normalized: sum = {sum} (expected 1.0)")]
    NotNormalized { sum: f64 },

    /// Negative probability or weight encountered.
    #[error("Negative probability encountered")]
    NegativeProbability,

    /// NaN or infinite value where a finite one was required.
    #[error("Non-finite value encountered: {value}")]
    NonFinite { value: f64 },

    /// All weights are zero (can't sample or normalize).
    #[error("Cannot normalize: all weights are zero")]
    ZeroWeights,

    /// Empty distribution.
    #[error("Distribution cannot be empty")]
    EmptyDistribution,

    /// Empty kernel.
    #[error("Kernel cannot be empty")]
    EmptyKernel,

    /// Rows have different lengths.
    #[error("Kernel has ragged rows (rows have different lengths)")]
    RaggedMatrix,

    /// A row doesn't sum to 1.
    #[error("Row {row} not normalized: sum = {sum} (expected 1.0)")]
    RowNotNormalized { row: usize, sum: f64 },

    /// Shape mismatch for composition, application or sampling.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Softmax temperature must be strictly positive.
    #[error("Temperature must be positive, got {temperature}")]
    NonPositiveTemperature { temperature: f64 },

    /// Linear system has no unique solution.
    #[error("Singular matrix: zero pivot in column {column}")]
    SingularMatrix { column: usize },
}
