//! Linear structural equation models: seeded simulation and covariance.
//!
//! Each variable is a weighted sum of its parents plus independent standard
//! normal noise. Edge weights are drawn uniformly from `±[0.5, 1.5]`, which
//! keeps every true edge well away from zero.

use grasp_kernel::graph::Dag;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use crate::runner::RunError;

const WEIGHT_LOW: f64 = 0.5;
const WEIGHT_HIGH: f64 = 1.5;

/// A DAG with one weight per edge.
#[derive(Debug, Clone)]
pub struct LinearSem {
    order: Vec<usize>,
    /// `(parent, weight)` per variable.
    weights: Vec<Vec<(usize, f64)>>,
}

impl LinearSem {
    /// Random weights for every edge of `dag`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Simulation`] if `dag` has a cycle.
    pub fn random<R: Rng + ?Sized>(dag: &Dag, rng: &mut R) -> Result<Self, RunError> {
        let order = dag.topological_order().ok_or_else(|| RunError::Simulation {
            detail: "graph has a directed cycle".into(),
        })?;
        let magnitude = Uniform::new_inclusive(WEIGHT_LOW, WEIGHT_HIGH);
        let mut weights = Vec::with_capacity(dag.len());
        for v in 0..dag.len() {
            let mut incoming = Vec::with_capacity(dag.parents(v).len());
            for &p in dag.parents(v) {
                let w = magnitude.sample(rng);
                incoming.push((p, if rng.gen_bool(0.5) { w } else { -w }));
            }
            weights.push(incoming);
        }
        Ok(Self { order, weights })
    }

    #[must_use]
    pub fn weight(&self, parent: usize, child: usize) -> Option<f64> {
        self.weights
            .get(child)?
            .iter()
            .find(|(p, _)| *p == parent)
            .map(|&(_, w)| w)
    }

    /// Draw `n` samples.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Simulation`] if the noise distribution cannot be
    /// built.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Dataset, RunError> {
        let noise = Normal::new(0.0, 1.0).map_err(|e| RunError::Simulation {
            detail: format!("noise distribution: {e}"),
        })?;
        let mut columns = vec![vec![0.0; n]; self.weights.len()];
        for row in 0..n {
            for &v in &self.order {
                let mut x = noise.sample(rng);
                for &(p, w) in &self.weights[v] {
                    x += w * columns[p][row];
                }
                columns[v][row] = x;
            }
        }
        Ok(Dataset { columns })
    }
}

/// Simulate `n` samples from `dag` with weights and noise drawn from `seed`.
///
/// # Errors
///
/// Returns [`RunError::Simulation`] if `dag` has a cycle.
pub fn simulate(dag: &Dag, n: usize, seed: u64) -> Result<Dataset, RunError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let sem = LinearSem::random(dag, &mut rng)?;
    sem.sample(n, &mut rng)
}

/// Column-major continuous data.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Vec<f64>>,
}

impl Dataset {
    /// Build from one column per variable.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Simulation`] if the columns differ in length.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, RunError> {
        if let Some(first) = columns.first() {
            if columns.iter().any(|c| c.len() != first.len()) {
                return Err(RunError::Simulation {
                    detail: "columns differ in length".into(),
                });
            }
        }
        Ok(Self { columns })
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn column(&self, v: usize) -> &[f64] {
        &self.columns[v]
    }

    /// Sample covariance (denominator `n - 1`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        let p = self.num_variables();
        let n = self.num_samples();
        let denom = n.saturating_sub(1).max(1) as f64;
        let means: Vec<f64> = self
            .columns
            .iter()
            .map(|c| c.iter().sum::<f64>() / n.max(1) as f64)
            .collect();
        let mut cov = vec![vec![0.0; p]; p];
        for i in 0..p {
            for j in i..p {
                let s: f64 = self.columns[i]
                    .iter()
                    .zip(&self.columns[j])
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum();
                cov[i][j] = s / denom;
                cov[j][i] = cov[i][j];
            }
        }
        cov
    }
}
