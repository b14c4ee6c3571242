//! Linear-Gaussian BIC from a covariance matrix.
//!
//! `score(t | P) = -n ln σ²(t | P) - c |P| ln n`, where `σ²(t | P)` is the
//! residual variance of regressing `t` on `P` and `c` is the penalty
//! discount. Singular parent covariance or a non-positive residual gives
//! NaN, which the search treats as inadmissible.

use grasp_search::score::Score;

use crate::runner::RunError;
use crate::sem::Dataset;

const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SemBicScore {
    covariance: Vec<Vec<f64>>,
    samples: usize,
    penalty_discount: f64,
}

impl SemBicScore {
    /// # Errors
    ///
    /// Returns [`RunError::Simulation`] unless `covariance` is square and
    /// `samples` is positive.
    pub fn from_covariance(
        covariance: Vec<Vec<f64>>,
        samples: usize,
        penalty_discount: f64,
    ) -> Result<Self, RunError> {
        let p = covariance.len();
        if covariance.iter().any(|row| row.len() != p) {
            return Err(RunError::Simulation {
                detail: "covariance matrix is not square".into(),
            });
        }
        if samples == 0 {
            return Err(RunError::Simulation {
                detail: "BIC needs at least one sample".into(),
            });
        }
        Ok(Self {
            covariance,
            samples,
            penalty_discount,
        })
    }

    /// # Errors
    ///
    /// Returns [`RunError::Simulation`] if the dataset is empty.
    pub fn from_dataset(data: &Dataset, penalty_discount: f64) -> Result<Self, RunError> {
        Self::from_covariance(data.covariance(), data.num_samples(), penalty_discount)
    }

    #[must_use]
    pub fn penalty_discount(&self) -> f64 {
        self.penalty_discount
    }

    /// Residual variance of `target` given `parents`, or `None` if singular.
    #[must_use]
    pub fn residual_variance(&self, target: usize, parents: &[usize]) -> Option<f64> {
        let s = &self.covariance;
        if parents.is_empty() {
            return Some(s[target][target]);
        }
        let a: Vec<Vec<f64>> = parents
            .iter()
            .map(|&i| parents.iter().map(|&j| s[i][j]).collect())
            .collect();
        let b: Vec<f64> = parents.iter().map(|&i| s[i][target]).collect();
        let beta = solve(a, b.clone())?;
        let explained: f64 = b.iter().zip(&beta).map(|(x, y)| x * y).sum();
        Some(s[target][target] - explained)
    }
}

impl Score for SemBicScore {
    fn num_variables(&self) -> usize {
        self.covariance.len()
    }

    #[allow(clippy::cast_precision_loss)]
    fn local_score(&self, target: usize, parents: &[usize]) -> f64 {
        let n = self.samples as f64;
        match self.residual_variance(target, parents) {
            Some(var) if var > 0.0 => {
                -n * var.ln() - self.penalty_discount * parents.len() as f64 * n.ln()
            }
            _ => f64::NAN,
        }
    }
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let k = b.len();
    for col in 0..k {
        let pivot = (col..k).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..k {
            let f = a[row][col] / a[col][col];
            for c in col..k {
                a[row][c] -= f * a[col][c];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = ((row + 1)..k).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
