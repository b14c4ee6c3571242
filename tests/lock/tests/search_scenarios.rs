//! GRaSP scenario lock tests.
//!
//! Proves:
//! 1. The fully reversed 4-chain converges to the true order with 3 edges
//! 2. A flat score terminates immediately with no edges and score 0
//! 3. Required knowledge wins over a score that prefers the other direction
//! 4. The final score never falls below the starting order's score
//! 5. Final orders respect tiered and forbidden knowledge

use grasp_harness::bic::SemBicScore;
use grasp_harness::oracles::{TruthRewardScore, ZeroScore};
use grasp_harness::runner::run_scenario;
use grasp_harness::scenarios::{EmptyGraph, RequiredPair, ReversedChain};
use grasp_harness::sem::simulate;
use grasp_kernel::knowledge::Knowledge;
use grasp_kernel::variables::Variables;
use grasp_search::grasp::{GraspSearch, TerminationReason};
use grasp_search::order_scorer::OrderScorer;
use grasp_search::policy::GraspPolicy;
use lock_tests::fixtures::{chain, random_dag, random_permutation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// 1. Reversed chain
// ---------------------------------------------------------------------------

// ACCEPTANCE: SCENARIO-REVERSED-CHAIN
#[test]
fn reversed_chain_recovers_true_order_for_many_seeds() {
    let score = TruthRewardScore::new(chain(4));
    for seed in 0..20 {
        let policy = GraspPolicy {
            seed,
            ..GraspPolicy::default()
        };
        let out = GraspSearch::with_score(&score, policy)
            .best_order(&[3, 2, 1, 0])
            .unwrap();
        assert_eq!(out.order, vec![0, 1, 2, 3], "seed {seed}");
        assert_eq!(out.num_edges(), 3, "seed {seed}");
        let dag = out.to_dag().unwrap().graph;
        assert_eq!(dag.edges(), vec![(0, 1), (1, 2), (2, 3)], "seed {seed}");
    }
}

// ACCEPTANCE: SCENARIO-REVERSED-CHAIN
#[test]
fn reversed_chain_converges_under_every_variant_mix() {
    let score = TruthRewardScore::new(chain(4));
    let policies = [
        GraspPolicy {
            ordered: false,
            ..GraspPolicy::default()
        },
        GraspPolicy {
            depth: 0,
            uncovered_depth: -1,
            non_singular_depth: -1,
            ..GraspPolicy::default()
        },
        GraspPolicy {
            cache_scores: false,
            backward_scoring: true,
            ..GraspPolicy::default()
        },
    ];
    for (i, policy) in policies.into_iter().enumerate() {
        let out = GraspSearch::with_score(&score, policy)
            .best_order(&[3, 2, 1, 0])
            .unwrap();
        assert_eq!(out.order, vec![0, 1, 2, 3], "policy {i}");
    }
}

// ACCEPTANCE: SCENARIO-REVERSED-CHAIN
#[test]
fn reversed_chain_scenario_report_has_zero_shd() {
    let report = run_scenario(&ReversedChain, &GraspPolicy::default()).unwrap();
    assert_eq!(report.body.metrics.shd, 0);
    assert_eq!(report.body.metrics.adjacency.recall(), Some(1.0));
}

// ---------------------------------------------------------------------------
// 2. Empty graph
// ---------------------------------------------------------------------------

// ACCEPTANCE: SCENARIO-EMPTY-GRAPH
#[test]
fn flat_score_keeps_order_and_finds_nothing() {
    let initial = [1, 3, 0, 2];
    let out = GraspSearch::with_score(&ZeroScore::new(4), GraspPolicy::default())
        .best_order(&initial)
        .unwrap();
    assert_eq!(out.order, initial.to_vec());
    assert_eq!(out.num_edges(), 0);
    assert!(out.score.abs() < f64::EPSILON, "score {}", out.score);
    assert_eq!(out.termination, TerminationReason::Converged);

    let report = run_scenario(&EmptyGraph { n: 4 }, &GraspPolicy::default()).unwrap();
    assert_eq!(report.body.cpdag.num_edges(), 0);
}

// ---------------------------------------------------------------------------
// 3. Required knowledge
// ---------------------------------------------------------------------------

// ACCEPTANCE: SCENARIO-REQUIRED-KNOWLEDGE
#[test]
fn required_edge_is_oriented_as_required() {
    let report = run_scenario(&RequiredPair, &GraspPolicy::default()).unwrap();
    let cpdag = &report.body.cpdag;
    assert!(cpdag.is_directed(1, 0), "expected X2 → X1");
    assert!(!cpdag.is_directed(0, 1), "X1 → X2 contradicts knowledge");
    assert_eq!(report.body.outcome.order, vec![1, 0]);
}

// ---------------------------------------------------------------------------
// 4. Monotonicity
// ---------------------------------------------------------------------------

// ACCEPTANCE: SCORE-MONOTONICITY
#[test]
fn final_score_not_below_starting_score() {
    for seed in 0..6 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dag = random_dag(6, 0.4, &mut rng);
        let data = simulate(&dag, 300, seed).unwrap();
        let score = SemBicScore::from_dataset(&data, 1.0).unwrap();
        let initial = random_permutation(6, &mut rng);

        let start = OrderScorer::from_score(&score)
            .score_order(&initial)
            .unwrap();
        let out = GraspSearch::with_score(&score, GraspPolicy::default())
            .best_order(&initial)
            .unwrap();
        assert!(
            out.score >= start - 1e-9 * start.abs().max(1.0),
            "seed {seed}: {} < {start}",
            out.score
        );
        assert!(out.to_dag().unwrap().graph.is_acyclic(), "seed {seed}");
    }
}

// ---------------------------------------------------------------------------
// 5. Knowledge respect
// ---------------------------------------------------------------------------

// ACCEPTANCE: KNOWLEDGE-RESPECT
#[test]
fn tiers_and_forbidden_edges_hold_in_final_order() {
    let vars = Variables::numbered(5);
    let mut kn = Knowledge::new();
    kn.add_to_tier(0, "X4")
        .add_to_tier(0, "X5")
        .add_to_tier(1, "X1")
        .add_to_tier(1, "X2")
        .add_to_tier(1, "X3")
        .forbid("X1", "X2");
    let k = kn.resolve(&vars).unwrap();

    for seed in 0..6 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dag = random_dag(5, 0.5, &mut rng);
        let data = simulate(&dag, 300, seed).unwrap();
        let score = SemBicScore::from_dataset(&data, 1.0).unwrap();
        let policy = GraspPolicy {
            num_starts: 3,
            seed,
            ..GraspPolicy::default()
        };
        let out = GraspSearch::with_score(&score, policy)
            .with_knowledge(&k)
            .best_order(&random_permutation(5, &mut rng))
            .unwrap();

        assert!(!k.violates_order(&out.order), "seed {seed}: {:?}", out.order);
        for (child, parents) in out.parents.iter().enumerate() {
            for &p in parents {
                assert!(
                    !k.is_forbidden(p, child),
                    "seed {seed}: forbidden edge {p} → {child}"
                );
            }
        }
    }
}

// ACCEPTANCE: KNOWLEDGE-RESPECT
#[test]
fn forbidden_within_tier_constrains_edges_not_order() {
    let vars = Variables::numbered(3);
    let mut kn = Knowledge::new();
    kn.add_to_tier(0, "X1")
        .add_to_tier(0, "X2")
        .set_tier_forbidden_within(0, true);
    let k = kn.resolve(&vars).unwrap();
    assert!(!k.violates_order(&[1, 0, 2]));

    let score = TruthRewardScore::new(chain(3));
    let out = GraspSearch::with_score(&score, GraspPolicy::default())
        .with_knowledge(&k)
        .best_order(&[2, 1, 0])
        .unwrap();
    assert!(
        !out.parents[0].contains(&1) && !out.parents[1].contains(&0),
        "X1 and X2 share a forbidden tier: {:?}",
        out.parents
    );
}
