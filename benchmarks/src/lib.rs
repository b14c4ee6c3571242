//! Shared helpers for GRaSP benchmark suites.

use grasp_harness::bic::SemBicScore;
use grasp_harness::sem::simulate;
use grasp_kernel::graph::Dag;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A seeded BIC search problem: a random DAG, data simulated from it, and a
/// shuffled starting order.
pub struct Regime {
    pub name: &'static str,
    pub truth: Dag,
    pub score: SemBicScore,
    pub initial: Vec<usize>,
}

/// Build a regime over `n` variables with edge probability `p`.
///
/// # Panics
///
/// Panics if simulation or score construction fails. Benchmark setup
/// failures are fatal.
#[must_use]
pub fn bic_regime(name: &'static str, n: usize, p: f64, samples: usize, seed: u64) -> Regime {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut truth = Dag::empty(n);
    for j in 0..n {
        for i in 0..j {
            if rng.gen_bool(p) {
                truth.add_edge(i, j).expect("i < j keeps the graph acyclic");
            }
        }
    }
    let data = simulate(&truth, samples, seed).expect("simulate");
    let score = SemBicScore::from_dataset(&data, 1.0).expect("bic score");
    let mut initial: Vec<usize> = (0..n).collect();
    initial.shuffle(&mut rng);
    Regime {
        name,
        truth,
        score,
        initial,
    }
}

/// The regimes shared by the micro and macro suites.
#[must_use]
pub fn standard_regimes() -> Vec<Regime> {
    vec![
        bic_regime("sparse_10", 10, 0.2, 500, 1),
        bic_regime("dense_10", 10, 0.5, 500, 2),
        bic_regime("sparse_20", 20, 0.1, 1000, 3),
    ]
}
