//! Knowledge and cancellation lock tests.
//!
//! Proves:
//! 1. Contradictory knowledge is a typed error, never a silent best effort
//! 2. Unknown names in knowledge surface through the runner
//! 3. A raised cancel flag ends the search with a valid, cancelled outcome
//! 4. Search errors pass through the runner with their message intact

use grasp_harness::oracles::TruthRewardScore;
use grasp_harness::runner::{run_scenario_with_cancel, RunError};
use grasp_harness::scenarios::ReversedChain;
use grasp_kernel::error::KernelError;
use grasp_kernel::knowledge::Knowledge;
use grasp_kernel::variables::Variables;
use grasp_search::cancel::CancelFlag;
use grasp_search::error::SearchError;
use grasp_search::grasp::{GraspSearch, TerminationReason};
use grasp_search::policy::GraspPolicy;
use lock_tests::fixtures::chain;

// ---------------------------------------------------------------------------
// 1-2. Knowledge errors
// ---------------------------------------------------------------------------

// ACCEPTANCE: KNOWLEDGE-CONTRADICTION
#[test]
fn cyclic_required_edges_are_rejected() {
    let vars = Variables::numbered(3);
    let mut kn = Knowledge::new();
    kn.require("X1", "X2").require("X2", "X3").require("X3", "X1");
    let k = kn.resolve(&vars).unwrap();

    let score = TruthRewardScore::new(chain(3));
    let err = GraspSearch::with_score(&score, GraspPolicy::default())
        .with_knowledge(&k)
        .best_order(&[0, 1, 2])
        .unwrap_err();
    match err {
        SearchError::Knowledge(KernelError::ContradictoryKnowledge { unordered }) => {
            assert_eq!(unordered.len(), 3, "{unordered:?}");
        }
        other => panic!("expected contradictory knowledge, got {other:?}"),
    }
}

// ACCEPTANCE: KNOWLEDGE-CONTRADICTION
#[test]
fn tiers_against_required_edge_are_rejected() {
    let vars = Variables::numbered(2);
    let mut kn = Knowledge::new();
    kn.add_to_tier(0, "X1").add_to_tier(1, "X2").require("X2", "X1");
    let k = kn.resolve(&vars).unwrap();

    let score = TruthRewardScore::new(chain(2));
    let err = GraspSearch::with_score(&score, GraspPolicy::default())
        .with_knowledge(&k)
        .best_order(&[0, 1])
        .unwrap_err();
    assert!(
        matches!(
            err,
            SearchError::Knowledge(KernelError::ContradictoryKnowledge { .. })
        ),
        "{err:?}"
    );
}

// ACCEPTANCE: KNOWLEDGE-CONTRADICTION
#[test]
fn unknown_name_in_knowledge_fails_resolution() {
    let mut kn = Knowledge::new();
    kn.forbid("X1", "Y9");
    let err = kn.resolve(&Variables::numbered(3)).unwrap_err();
    assert_eq!(err, KernelError::UnknownVariable { name: "Y9".into() });
}

// ---------------------------------------------------------------------------
// 3. Cancellation
// ---------------------------------------------------------------------------

// ACCEPTANCE: CANCELLATION
#[test]
fn pre_cancelled_run_returns_valid_cancelled_outcome() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let report =
        run_scenario_with_cancel(&ReversedChain, &GraspPolicy::default(), cancel).unwrap();
    let out = &report.body.outcome;
    assert_eq!(out.termination, TerminationReason::Cancelled);
    assert_eq!(out.restarts_completed, 0);

    let mut sorted = out.order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3], "outcome order is still a permutation");
    assert!(out.to_dag().unwrap().graph.is_acyclic());
}

// ACCEPTANCE: CANCELLATION
#[test]
fn cancel_flag_clones_share_state() {
    let cancel = CancelFlag::new();
    let score = TruthRewardScore::new(chain(4));
    let search = GraspSearch::with_score(&score, GraspPolicy::default()).with_cancel(cancel.clone());
    assert!(!search.cancel_flag().is_cancelled());
    cancel.cancel();
    assert!(search.cancel_flag().is_cancelled());

    let out = search.best_order(&[3, 2, 1, 0]).unwrap();
    assert_eq!(out.termination, TerminationReason::Cancelled);
}

// ACCEPTANCE: ERROR-PROPAGATION
#[test]
fn runner_errors_keep_their_source() {
    let err: RunError = SearchError::InvalidPolicy {
        detail: "num_starts must be at least 1".into(),
    }
    .into();
    assert!(err.to_string().contains("num_starts"));
}
