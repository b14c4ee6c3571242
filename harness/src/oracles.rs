//! Ground-truth oracles for scenarios and tests.

use grasp_kernel::graph::Dag;
use grasp_search::score::{IndependenceTest, Score};

/// Score that knows the true DAG.
///
/// Each parent contributes `+2` if it is a true parent of the target, `+1`
/// if it is a true child, and `-1` otherwise. Orders agreeing with the truth
/// score strictly higher than orders that reverse a true edge, so the search
/// recovers the true order on chains and trees.
#[derive(Debug, Clone)]
pub struct TruthRewardScore {
    truth: Dag,
}

impl TruthRewardScore {
    #[must_use]
    pub fn new(truth: Dag) -> Self {
        Self { truth }
    }
}

impl Score for TruthRewardScore {
    fn num_variables(&self) -> usize {
        self.truth.len()
    }

    fn local_score(&self, target: usize, parents: &[usize]) -> f64 {
        parents
            .iter()
            .map(|&p| {
                if self.truth.has_edge(p, target) {
                    2.0
                } else if self.truth.has_edge(target, p) {
                    1.0
                } else {
                    -1.0
                }
            })
            .sum()
    }
}

/// Pure-noise score: 0 for every parent set.
#[derive(Debug, Clone, Copy)]
pub struct ZeroScore {
    n: usize,
}

impl ZeroScore {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Score for ZeroScore {
    fn num_variables(&self) -> usize {
        self.n
    }

    fn local_score(&self, _target: usize, _parents: &[usize]) -> f64 {
        0.0
    }
}

/// Independence read off the true DAG by d-separation.
#[derive(Debug, Clone)]
pub struct DSeparationTest {
    truth: Dag,
}

impl DSeparationTest {
    #[must_use]
    pub fn new(truth: Dag) -> Self {
        Self { truth }
    }
}

impl IndependenceTest for DSeparationTest {
    fn num_variables(&self) -> usize {
        self.truth.len()
    }

    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool {
        self.truth.is_d_separated(x, y, z)
    }
}
