//! Graph builders, seeded randomness and scorer invariant checks.

use grasp_kernel::graph::Dag;
use grasp_search::order_scorer::OrderScorer;
use rand::seq::SliceRandom;
use rand::Rng;

/// `X1 → X2 → … → Xn`.
///
/// # Panics
///
/// Never for `n >= 1`; edges are in range by construction.
#[must_use]
pub fn chain(n: usize) -> Dag {
    let edges: Vec<(usize, usize)> = (1..n).map(|v| (v - 1, v)).collect();
    Dag::from_edges(n, &edges).unwrap()
}

/// `X1 → X3 ← X2`, `X3 → X4`.
///
/// # Panics
///
/// Never; edges are in range by construction.
#[must_use]
pub fn collider4() -> Dag {
    Dag::from_edges(4, &[(0, 2), (1, 2), (2, 3)]).unwrap()
}

/// Random DAG over `n` nodes: each pair `i < j` is an edge `i → j` with
/// probability `p`.
///
/// # Panics
///
/// Never; edges are in range by construction.
pub fn random_dag<R: Rng>(n: usize, p: f64, rng: &mut R) -> Dag {
    let mut dag = Dag::empty(n);
    for j in 0..n {
        for i in 0..j {
            if rng.gen_bool(p) {
                dag.add_edge(i, j).unwrap();
            }
        }
    }
    dag
}

pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut v: Vec<usize> = (0..n).collect();
    v.shuffle(rng);
    v
}

/// Check every scorer invariant against a from-scratch recomputation.
///
/// # Panics
///
/// Panics with a description of the first broken invariant.
pub fn assert_scorer_invariants(s: &OrderScorer<'_>, context: &str) {
    let order = s.order();
    let mut seen = vec![false; s.num_variables()];
    for (p, &v) in order.iter().enumerate() {
        assert!(!seen[v], "{context}: variable {v} appears twice");
        seen[v] = true;
        assert_eq!(s.index(v), p, "{context}: stale index for {v}");

        let fresh = s.grow_shrink(p);
        assert_eq!(
            s.position_score(p),
            &fresh,
            "{context}: cached position score at {p} differs from recomputation"
        );
        for &parent in fresh.parents() {
            assert!(
                s.index(parent) < p,
                "{context}: parent {parent} of {v} is not in the prefix"
            );
        }
    }
    assert!(seen.iter().all(|&b| b), "{context}: order is not a permutation");

    let recomputed = s.recomputed_score();
    let tol = 1e-7 * recomputed.abs().max(1.0);
    assert!(
        (s.score() - recomputed).abs() <= tol || s.score() == recomputed,
        "{context}: running score {} != recomputed {}",
        s.score(),
        recomputed
    );
    let dag = s
        .to_dag()
        .unwrap_or_else(|e| panic!("{context}: parent sets do not form a graph: {e}"));
    assert!(dag.is_acyclic(), "{context}: implied graph has a cycle");
}
