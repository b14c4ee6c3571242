//! Oracle recovery lock tests.
//!
//! Proves:
//! 1. With a perfect d-separation oracle the collider's equivalence class is
//!    recovered exactly, including the v-structure
//! 2. BIC on plentiful simulated chain data recovers every adjacency and
//!    nothing else

use grasp_harness::oracles::DSeparationTest;
use grasp_harness::runner::run_scenario;
use grasp_harness::scenarios::{OracleCollider, SemChain};
use grasp_kernel::graph::Cpdag;
use grasp_search::grasp::GraspSearch;
use grasp_search::policy::GraspPolicy;
use lock_tests::fixtures::collider4;

// ---------------------------------------------------------------------------
// 1. d-separation
// ---------------------------------------------------------------------------

// ACCEPTANCE: ORACLE-COLLIDER
#[test]
fn dsep_oracle_recovers_collider_cpdag() {
    let policy = GraspPolicy {
        num_starts: 5,
        ..GraspPolicy::default()
    };
    let report = run_scenario(&OracleCollider, &policy).unwrap();
    let m = report.body.metrics;
    assert_eq!(m.shd, 0, "metrics: {m:?}");

    let cpdag = &report.body.cpdag;
    assert!(cpdag.is_directed(0, 2), "X1 → X3");
    assert!(cpdag.is_directed(1, 2), "X2 → X3");
    assert!(cpdag.is_directed(2, 3), "X3 → X4 by Meek R1");
    assert!(!cpdag.is_adjacent(0, 1), "X1 and X2 are marginally independent");
}

// ACCEPTANCE: ORACLE-COLLIDER
#[test]
fn unbounded_dsep_search_from_every_start_matches_truth_class() {
    let unbounded = GraspPolicy {
        depth: 0,
        uncovered_depth: -1,
        non_singular_depth: -1,
        ..GraspPolicy::default()
    };
    let truth = Cpdag::from_dag(&collider4());
    let test = DSeparationTest::new(collider4());
    let starts: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 3, 0, 1], [1, 3, 2, 0]];
    for start in starts {
        let out = GraspSearch::with_test(&test, unbounded.clone())
            .best_order(&start)
            .unwrap();
        let cpdag = out.to_cpdag(None).unwrap().graph;
        assert_eq!(cpdag, truth, "start {start:?}, order {:?}", out.order);
    }
}

// ---------------------------------------------------------------------------
// 2. BIC on simulated data
// ---------------------------------------------------------------------------

// ACCEPTANCE: SEM-BIC-RECOVERY
#[test]
fn sem_bic_recovers_chain_adjacencies() {
    let report = run_scenario(&SemChain::default(), &GraspPolicy::default()).unwrap();
    let adj = report.body.metrics.adjacency;
    assert_eq!(adj.precision(), Some(1.0), "adjacency {adj:?}");
    assert_eq!(adj.recall(), Some(1.0), "adjacency {adj:?}");
    // A chain has no v-structure; nothing should be oriented.
    assert_eq!(report.body.cpdag.num_undirected(), 3);
}
