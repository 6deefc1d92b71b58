//! Dense linear solves.
//!
//! Systems here are small (one row per game state), so a straightforward
//! Gaussian elimination with partial pivoting over `Vec<Vec<f64>>` is enough.

use crate::error::ProbError;

/// Pivots smaller than this are treated as zero.
const PIVOT_EPSILON: f64 = 1e-12;

/// Solve `A x = b` for a square `A`.
///
/// # Errors
///
/// - [`ProbError::ShapeMismatch`] if `A` is not square or `b` has the wrong length
/// - [`ProbError::SingularMatrix`] if a pivot vanishes
///
/// ```rust
/// use quantal_prob::linalg::solve;
///
/// let x = solve(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
/// assert!((x[0] - 0.8).abs() < 1e-12);
/// assert!((x[1] - 1.4).abs() < 1e-12);
/// ```
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, ProbError> {
    let n = a.len();
    if b.len() != n {
        return Err(ProbError::ShapeMismatch {
            expected: n,
            got: b.len(),
        });
    }
    if let Some(row) = a.iter().find(|row| row.len() != n) {
        return Err(ProbError::ShapeMismatch {
            expected: n,
            got: row.len(),
        });
    }

    // Forward elimination
    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(ProbError::SingularMatrix { column: col });
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            let (upper, lower) = a.split_at_mut(row);
            for (target, &source) in lower[0][col..].iter_mut().zip(upper[col][col..].iter()) {
                *target -= factor * source;
            }
            let b_col = b[col];
            b[row] -= factor * b_col;
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_identity() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let x = solve(a, vec![4.0, -2.0]).unwrap();
        assert_eq!(x, vec![4.0, -2.0]);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        // Zero in the leading position forces a row swap
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let x = solve(a, vec![2.0, 3.0]).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(matches!(
            solve(a, vec![1.0, 2.0]),
            Err(ProbError::SingularMatrix { column: 1 })
        ));
    }

    #[test]
    fn test_solve_shape_mismatch() {
        let a = vec![vec![1.0, 2.0], vec![2.0]];
        assert!(matches!(
            solve(a, vec![1.0, 2.0]),
            Err(ProbError::ShapeMismatch { .. })
        ));
    }
}
