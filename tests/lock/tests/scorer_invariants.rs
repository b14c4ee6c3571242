//! Order scorer lock tests.
//!
//! Proves, over seeded random DAGs with BIC scores on simulated data:
//! 1. The running score equals a from-scratch recomputation after any edit
//! 2. Every parent precedes its child; the implied graph is acyclic
//! 3. Bookmark, arbitrary edits, restore: order, scores and total come back
//! 4. Grow-Shrink is deterministic on a fixed prefix
//! 5. 1-3 hold for every scorer configuration: independence tests, capped
//!    in-degree with tied candidates, backward scoring, and knowledge

use grasp_harness::bic::SemBicScore;
use grasp_harness::oracles::{DSeparationTest, TruthRewardScore};
use grasp_harness::sem::simulate;
use grasp_kernel::knowledge::{Knowledge, KnowledgeIndex};
use grasp_kernel::variables::Variables;
use grasp_search::bookmark::BookmarkKey;
use grasp_search::order_scorer::OrderScorer;
use grasp_search::position::PositionScore;
use lock_tests::fixtures::{assert_scorer_invariants, random_dag, random_permutation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const VARS: usize = 7;

fn bic_for_seed(seed: u64) -> SemBicScore {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dag = random_dag(VARS, 0.35, &mut rng);
    let data = simulate(&dag, 400, seed).unwrap();
    SemBicScore::from_dataset(&data, 1.0).unwrap()
}

/// One random edit: a move, a swap or a tuck.
fn random_edit(s: &mut OrderScorer<'_>, rng: &mut ChaCha8Rng) -> &'static str {
    let n = s.len();
    match rng.gen_range(0..3) {
        0 => {
            let v = rng.gen_range(0..n);
            s.move_to(v, rng.gen_range(0..n));
            "move_to"
        }
        1 => {
            s.swap(rng.gen_range(0..n), rng.gen_range(0..n));
            "swap"
        }
        _ => {
            let k = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            s.tuck(k, j);
            "tuck"
        }
    }
}

// ---------------------------------------------------------------------------
// 1-2. Running score and structural validity
// ---------------------------------------------------------------------------

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn running_score_matches_recompute_after_random_edits() {
    for seed in 0..5 {
        let score = bic_for_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(100 + seed);
        let mut s = OrderScorer::from_score(&score);
        s.score_order(&random_permutation(VARS, &mut rng)).unwrap();
        assert_scorer_invariants(&s, &format!("seed {seed} initial"));

        for step in 0..40 {
            let op = random_edit(&mut s, &mut rng);
            assert_scorer_invariants(&s, &format!("seed {seed} step {step} after {op}"));
        }
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn move_to_no_update_then_update_scores_restores_invariants() {
    let score = bic_for_seed(11);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut s = OrderScorer::from_score(&score);
    s.score_order(&random_permutation(VARS, &mut rng)).unwrap();

    let (a, b) = (s.get(1), s.get(5));
    s.move_to_no_update(a, 5);
    s.move_to_no_update(b, 1);
    s.update_scores(1, 5);
    assert_scorer_invariants(&s, "batched moves");
}

// ---------------------------------------------------------------------------
// 3. Bookmark round-trip
// ---------------------------------------------------------------------------

// ACCEPTANCE: BOOKMARK-ROUNDTRIP-LOCK
#[test]
fn bookmark_round_trip_over_random_edit_sequences() {
    for seed in 0..5 {
        let score = bic_for_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(200 + seed);
        let mut s = OrderScorer::from_score(&score);
        s.score_order(&random_permutation(VARS, &mut rng)).unwrap();

        for round in 0..5 {
            let key = BookmarkKey::Named(round);
            let order = s.order().to_vec();
            let scores: Vec<PositionScore> =
                (0..VARS).map(|p| s.position_score(p).clone()).collect();
            let total = s.score();

            s.bookmark(key);
            for _ in 0..rng.gen_range(1..15) {
                random_edit(&mut s, &mut rng);
            }
            s.go_to_bookmark(key).unwrap();

            assert_eq!(s.order(), order.as_slice(), "seed {seed} round {round}: order");
            for (p, expected) in scores.iter().enumerate() {
                assert_eq!(
                    s.position_score(p),
                    expected,
                    "seed {seed} round {round}: position {p}"
                );
            }
            assert_eq!(
                s.score().to_bits(),
                total.to_bits(),
                "seed {seed} round {round}: running score"
            );
            assert_scorer_invariants(&s, &format!("seed {seed} round {round} restored"));

            // Walk away from the bookmark so the next round starts elsewhere.
            random_edit(&mut s, &mut rng);
        }
    }
}

// ACCEPTANCE: BOOKMARK-ROUNDTRIP-LOCK
#[test]
fn rebookmarking_a_key_overwrites_it() {
    let score = bic_for_seed(3);
    let mut s = OrderScorer::from_score(&score);
    s.score_order(&(0..VARS).collect::<Vec<_>>()).unwrap();
    let key = BookmarkKey::Depth(1);

    s.bookmark(key);
    s.move_to(0, VARS - 1);
    let moved = s.order().to_vec();
    s.bookmark(key);
    s.move_to(3, 0);
    s.go_to_bookmark(key).unwrap();
    assert_eq!(s.order(), moved.as_slice());
    assert_scorer_invariants(&s, "re-bookmarked");
}

// ---------------------------------------------------------------------------
// 4. Grow-Shrink determinism
// ---------------------------------------------------------------------------

// ACCEPTANCE: GROW-SHRINK-DETERMINISM-LOCK
#[test]
fn grow_shrink_twice_on_same_prefix_is_identical() {
    let score = bic_for_seed(5);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut s = OrderScorer::from_score(&score);
    s.score_order(&random_permutation(VARS, &mut rng)).unwrap();
    for p in 0..VARS {
        let a = s.grow_shrink(p);
        let b = s.grow_shrink(p);
        assert_eq!(a, b, "position {p}");
        assert_eq!(a.score().to_bits(), b.score().to_bits(), "position {p}");
    }
}

// ACCEPTANCE: GROW-SHRINK-DETERMINISM-LOCK
#[test]
fn scoring_the_same_order_twice_is_idempotent() {
    let score = bic_for_seed(8);
    let order = random_permutation(VARS, &mut ChaCha8Rng::seed_from_u64(8));
    let mut s = OrderScorer::from_score(&score);
    let first = s.score_order(&order).unwrap();
    let parents = s.parent_sets();
    let second = s.score_order(&order).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(parents, s.parent_sets());
}

// ---------------------------------------------------------------------------
// 5. Scorer configurations
// ---------------------------------------------------------------------------

const EDITS: usize = 60;

/// Random edits from a random order, checking invariants after each, with a
/// bookmark round-trip every tenth step.
fn exercise(mut s: OrderScorer<'_>, seed: u64, label: &str) {
    let mut rng = ChaCha8Rng::seed_from_u64(300 + seed);
    s.score_order(&random_permutation(VARS, &mut rng)).unwrap();
    assert_scorer_invariants(&s, &format!("{label} seed {seed} initial"));

    for step in 0..EDITS {
        if step % 10 == 0 {
            let key = BookmarkKey::Depth(step);
            let order = s.order().to_vec();
            let total = s.score();
            s.bookmark(key);
            for _ in 0..rng.gen_range(1..8) {
                random_edit(&mut s, &mut rng);
            }
            s.go_to_bookmark(key).unwrap();
            assert_eq!(s.order(), order.as_slice(), "{label} seed {seed} step {step}");
            assert_eq!(
                s.score().to_bits(),
                total.to_bits(),
                "{label} seed {seed} step {step}: restored score"
            );
        }
        let op = random_edit(&mut s, &mut rng);
        assert_scorer_invariants(&s, &format!("{label} seed {seed} step {step} after {op}"));
    }
}

fn truth_for_seed(seed: u64) -> grasp_kernel::graph::Dag {
    random_dag(VARS, 0.4, &mut ChaCha8Rng::seed_from_u64(seed))
}

fn seven_variable_knowledge() -> KnowledgeIndex {
    let mut kn = Knowledge::new();
    kn.require("X1", "X4")
        .require("X3", "X7")
        .forbid("X2", "X5")
        .forbid("X6", "X1")
        .add_to_tier(0, "X2")
        .add_to_tier(1, "X6");
    kn.resolve(&Variables::numbered(VARS)).unwrap()
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn independence_test_scorer_keeps_invariants() {
    for seed in 0..10 {
        let test = DSeparationTest::new(truth_for_seed(seed));
        exercise(OrderScorer::from_test(&test), seed, "test");
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn capped_independence_test_scorer_keeps_invariants() {
    for seed in 0..10 {
        let test = DSeparationTest::new(truth_for_seed(seed));
        let s = OrderScorer::from_test(&test).with_max_indegree(Some(2));
        exercise(s, seed, "test cap 2");
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn capped_score_with_ties_keeps_invariants() {
    for seed in 0..10 {
        let score = TruthRewardScore::new(truth_for_seed(seed));
        let s = OrderScorer::from_score(&score).with_max_indegree(Some(1));
        exercise(s, seed, "truth reward cap 1");
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn capped_bic_keeps_invariants() {
    for seed in 0..5 {
        let score = bic_for_seed(seed);
        let s = OrderScorer::from_score(&score).with_max_indegree(Some(2));
        exercise(s, seed, "bic cap 2");
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn backward_scoring_keeps_invariants() {
    for seed in 0..5 {
        let score = bic_for_seed(seed);
        exercise(
            OrderScorer::from_score(&score).with_backward_scoring(true),
            seed,
            "bic backward",
        );
        let truth = TruthRewardScore::new(truth_for_seed(seed));
        exercise(
            OrderScorer::from_score(&truth).with_backward_scoring(true),
            seed,
            "truth reward backward",
        );
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn knowledge_constrained_scorers_keep_invariants() {
    let k = seven_variable_knowledge();
    for seed in 0..5 {
        let score = bic_for_seed(seed);
        exercise(
            OrderScorer::from_score(&score).with_knowledge(&k),
            seed,
            "bic knowledge",
        );
        let test = DSeparationTest::new(truth_for_seed(seed));
        exercise(
            OrderScorer::from_test(&test)
                .with_knowledge(&k)
                .with_max_indegree(Some(2)),
            seed,
            "test knowledge cap 2",
        );
    }
}

// ACCEPTANCE: RUNNING-SCORE-LOCK
#[test]
fn knowledge_constrained_parents_respect_constraints() {
    let k = seven_variable_knowledge();
    let score = bic_for_seed(4);
    let mut s = OrderScorer::from_score(&score).with_knowledge(&k);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for _ in 0..20 {
        s.score_order(&random_permutation(VARS, &mut rng)).unwrap();
        for (child, parents) in s.parent_sets().iter().enumerate() {
            for &p in parents {
                assert!(!k.is_forbidden(p, child), "forbidden parent {p} of {child}");
            }
            for &r in k.required_parents(child) {
                if s.index(r) < s.index(child) {
                    assert!(parents.contains(&r), "required parent {r} of {child} dropped");
                }
            }
        }
    }
}
