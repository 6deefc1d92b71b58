//! Probability distributions over finite sets, and categorical sampling.

use rand::Rng;

use crate::error::ProbError;
use crate::PROB_TOLERANCE;

/// A probability distribution over a finite set {0, 1, ..., n-1}.
///
/// Invariants:
/// - All probabilities are non-negative
/// - Probabilities sum to 1 (within tolerance)
///
/// # Example
///
/// ```rust
/// use quantal_prob::Dist;
///
/// // Fair coin
/// let coin = Dist::uniform(2);
/// assert!((coin.p[0] - 0.5).abs() < 1e-12);
///
/// let loaded = Dist::new(vec![0.9, 0.1]).unwrap();
/// assert!((coin.l1_distance(&loaded).unwrap() - 0.8).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dist {
    /// Probability vector (sums to 1).
    pub p: Vec<f64>,
}

impl Dist {
    /// Create a new distribution from a probability vector.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The vector is empty
    /// - Any probability is negative or non-finite
    /// - The probabilities don't sum to 1 (within tolerance)
    pub fn new(p: Vec<f64>) -> Result<Self, ProbError> {
        if p.is_empty() {
            return Err(ProbError::EmptyDistribution);
        }

        if let Some(&value) = p.iter().find(|x| !x.is_finite()) {
            return Err(ProbError::NonFinite { value });
        }

        if p.iter().any(|&x| x < -PROB_TOLERANCE) {
            return Err(ProbError::NegativeProbability);
        }

        let sum: f64 = p.iter().sum();
        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(ProbError::NotNormalized { sum });
        }

        Ok(Self { p })
    }

    /// Create a uniform distribution over n elements.
    pub fn uniform(n: usize) -> Self {
        assert!(n > 0, "Cannot create uniform distribution over empty set");
        Self {
            p: vec![1.0 / n as f64; n],
        }
    }

    /// The number of outcomes in the sample space.
    pub fn len(&self) -> usize {
        self.p.len()
    }

    /// Check if the distribution is over an empty set (always false for valid Dist).
    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    /// Get the probability of outcome i.
    pub fn prob(&self, i: usize) -> Result<f64, ProbError> {
        self.p.get(i).copied().ok_or(ProbError::IndexOutOfBounds {
            index: i,
            size: self.p.len(),
        })
    }

    /// L1 distance `Σ |p[i] - q[i]|`.
    pub fn l1_distance(&self, other: &Dist) -> Result<f64, ProbError> {
        l1_distance(&self.p, &other.p)
    }
}

/// Validate sampling weights and return their sum.
fn check_weights(weights: &[f64]) -> Result<f64, ProbError> {
    if weights.is_empty() {
        return Err(ProbError::EmptyDistribution);
    }
    if let Some(&value) = weights.iter().find(|x| !x.is_finite()) {
        return Err(ProbError::NonFinite { value });
    }
    // Rounding noise from in-place updates may leave tiny negatives
    if weights.iter().any(|&x| x < -PROB_TOLERANCE) {
        return Err(ProbError::NegativeProbability);
    }
    let sum: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if sum <= 0.0 {
        return Err(ProbError::ZeroWeights);
    }
    Ok(sum)
}

/// Draw an index with probability proportional to `weights`.
///
/// Weights need not be normalized, but must be finite, non-negative (up to
/// [`PROB_TOLERANCE`]) and not all zero. An outcome with zero weight is never returned.
///
/// ```rust
/// use quantal_prob::categorical;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let i = categorical(&[0.0, 3.0, 0.0], &mut rng).unwrap();
/// assert_eq!(i, 1);
/// ```
pub fn categorical<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize, ProbError> {
    let total = check_weights(weights)?;
    let u = rng.random::<f64>() * total;

    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w.max(0.0);
        if u < cumsum {
            return Ok(i);
        }
    }
    Ok(weights.iter().rposition(|&w| w > 0.0).unwrap_or(weights.len() - 1))
}

/// `x ln x`, continuously extended with `0 ln 0 = 0`.
pub fn xlogx(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * x.ln()
    }
}

/// Negative Shannon entropy `Σ x ln x` of a probability row.
pub fn neg_entropy(p: &[f64]) -> f64 {
    p.iter().map(|&x| xlogx(x)).sum()
}

/// L1 distance between two equally sized vectors.
pub fn l1_distance(a: &[f64], b: &[f64]) -> Result<f64, ProbError> {
    if a.len() != b.len() {
        return Err(ProbError::ShapeMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum())
}

/// Softmax of `values / temperature`, stabilized by subtracting the maximum.
///
/// `σ(i) ∝ exp((v[i] - max v) / τ)`
///
/// As τ → 0 this approaches a uniform distribution over the argmax set.
pub fn softmax(values: &[f64], temperature: f64) -> Result<Dist, ProbError> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(ProbError::NonPositiveTemperature { temperature });
    }
    if values.is_empty() {
        return Err(ProbError::EmptyDistribution);
    }
    if let Some(&value) = values.iter().find(|x| !x.is_finite()) {
        return Err(ProbError::NonFinite { value });
    }

    let max_val = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values
        .iter()
        .map(|v| ((v - max_val) / temperature).exp())
        .collect();
    // The maximum contributes exp(0) = 1, so the total is at least 1
    let total: f64 = exps.iter().sum();

    Ok(Dist {
        p: exps.into_iter().map(|e| e / total).collect(),
    })
}
