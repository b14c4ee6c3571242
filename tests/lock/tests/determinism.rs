//! Determinism lock tests.
//!
//! Proves: a fixed seed and fixed inputs produce byte-identical canonical
//! reports, run after run, and different seeds are not silently ignored.

use grasp_harness::runner::run_scenario;
use grasp_harness::scenarios::{OracleCollider, ReversedChain, SemChain};
use grasp_kernel::digest::canon::canonical_json_bytes;
use grasp_search::policy::GraspPolicy;

const RUNS: usize = 5;

fn multi_start(seed: u64) -> GraspPolicy {
    GraspPolicy {
        num_starts: 4,
        use_data_order: false,
        seed,
        ..GraspPolicy::default()
    }
}

// ACCEPTANCE: DETERMINISM-LOCK
#[test]
fn same_seed_same_report_digest() {
    let policy = multi_start(42);
    let first = run_scenario(&SemChain::default(), &policy).unwrap();
    let first_bytes = canonical_json_bytes(&first.to_json()).unwrap();
    for run in 1..RUNS {
        let again = run_scenario(&SemChain::default(), &policy).unwrap();
        assert_eq!(again.report_digest, first.report_digest, "run {run}");
        assert_eq!(
            canonical_json_bytes(&again.to_json()).unwrap(),
            first_bytes,
            "run {run}: canonical bytes drifted"
        );
    }
}

// ACCEPTANCE: DETERMINISM-LOCK
#[test]
fn same_seed_same_outcome_under_independence_test() {
    let policy = multi_start(7);
    let a = run_scenario(&OracleCollider, &policy).unwrap();
    let b = run_scenario(&OracleCollider, &policy).unwrap();
    assert_eq!(a.body.outcome, b.body.outcome);
    assert_eq!(a.body.order_digest, b.body.order_digest);
    assert_eq!(a.body.graph_digest, b.body.graph_digest);
}

// ACCEPTANCE: DETERMINISM-LOCK
#[test]
fn seed_is_bound_into_the_report_digest() {
    // Both seeds converge to the same graph; the policy in the report still
    // differs, so the report digests must too.
    let a = run_scenario(&ReversedChain, &multi_start(1)).unwrap();
    let b = run_scenario(&ReversedChain, &multi_start(2)).unwrap();
    assert_eq!(a.body.graph_digest, b.body.graph_digest);
    assert_ne!(a.report_digest, b.report_digest);
}
