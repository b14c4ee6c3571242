//! Recovery metrics of an estimated CPDAG against the true one.
//!
//! Counts are kept as integers so reports stay canonical-JSON friendly;
//! ratios are derived on demand.

use grasp_kernel::graph::Cpdag;
use serde_json::{json, Value};

/// Confusion counts for one edge feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl Confusion {
    /// `tp / (tp + fp)`, or `None` when nothing was predicted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn precision(&self) -> Option<f64> {
        let d = self.true_positives + self.false_positives;
        (d > 0).then(|| self.true_positives as f64 / d as f64)
    }

    /// `tp / (tp + fn)`, or `None` when nothing was there to find.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn recall(&self) -> Option<f64> {
        let d = self.true_positives + self.false_negatives;
        (d > 0).then(|| self.true_positives as f64 / d as f64)
    }

    fn to_json(self) -> Value {
        json!({
            "tp": self.true_positives,
            "fp": self.false_positives,
            "fn": self.false_negatives,
        })
    }
}

/// Adjacency and arrowhead confusion plus structural Hamming distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub adjacency: Confusion,
    pub arrowhead: Confusion,
    /// Pairs whose adjacency or edge mark differs.
    pub shd: usize,
}

impl Metrics {
    #[must_use]
    pub fn compare(estimated: &Cpdag, truth: &Cpdag) -> Self {
        let n = estimated.len().max(truth.len());
        let mut m = Self::default();
        for a in 0..n {
            for b in (a + 1)..n {
                let (ea, ta) = (estimated.is_adjacent(a, b), truth.is_adjacent(a, b));
                match (ea, ta) {
                    (true, true) => m.adjacency.true_positives += 1,
                    (true, false) => m.adjacency.false_positives += 1,
                    (false, true) => m.adjacency.false_negatives += 1,
                    (false, false) => continue,
                }
                if ea != ta || mark(estimated, a, b) != mark(truth, a, b) {
                    m.shd += 1;
                }
                for (from, to) in [(a, b), (b, a)] {
                    match (estimated.is_directed(from, to), truth.is_directed(from, to)) {
                        (true, true) => m.arrowhead.true_positives += 1,
                        (true, false) => m.arrowhead.false_positives += 1,
                        (false, true) => m.arrowhead.false_negatives += 1,
                        (false, false) => {}
                    }
                }
            }
        }
        m
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "adjacency": self.adjacency.to_json(),
            "arrowhead": self.arrowhead.to_json(),
            "shd": self.shd,
        })
    }
}

#[derive(PartialEq, Eq)]
enum Mark {
    None,
    Undirected,
    Forward,
    Backward,
}

fn mark(g: &Cpdag, a: usize, b: usize) -> Mark {
    if g.is_directed(a, b) {
        Mark::Forward
    } else if g.is_directed(b, a) {
        Mark::Backward
    } else if g.is_undirected(a, b) {
        Mark::Undirected
    } else {
        Mark::None
    }
}
