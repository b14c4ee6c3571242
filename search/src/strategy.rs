//! Grow-Shrink parent selection, in two interchangeable strategies.
//!
//! A strategy answers one question: given a target variable and the prefix
//! of the order before it, which parent set does Grow-Shrink settle on, and
//! what does that position contribute to the order's total score?
//!
//! - [`ScoreStrategy`] climbs a [`Score`]: greedy best-first grow, then
//!   greedy best-first shrink. The position contributes the final local score.
//! - [`TestStrategy`] follows an [`IndependenceTest`]: grow adds dependent
//!   candidates, shrink drops parents made independent by the others. The
//!   position contributes `-|parents|`, so the total rewards sparsity.
//!
//! The strategy is chosen once, when the scorer is built.
//!
//! # Determinism
//!
//! The result is a function of the prefix as a set. Candidates are scanned
//! in ascending variable index whatever their positions in the order, and
//! the first candidate reaching the maximum wins; ties are never randomized
//! here. The scorer's ranged updates rely on this: a move that only permutes
//! the prefix of a later position leaves that position's result unchanged.
//! Run-to-run variation in a search comes only from the driver's shuffled
//! visiting order.

use grasp_kernel::knowledge::KnowledgeIndex;

use crate::position::PositionScore;
use crate::score::{IndependenceTest, Score};

/// Constraints every strategy honors while selecting parents.
#[derive(Debug, Clone, Copy)]
pub struct GrowShrinkRules<'k> {
    pub knowledge: &'k KnowledgeIndex,
    /// Grow stops once the parent set reaches this size.
    pub max_indegree: Option<usize>,
    /// Start from every admissible prefix candidate instead of the empty set.
    pub backward: bool,
}

impl GrowShrinkRules<'_> {
    fn at_cap(&self, len: usize) -> bool {
        self.max_indegree.is_some_and(|cap| len >= cap)
    }

    fn admissible(&self, candidate: usize, target: usize) -> bool {
        !self.knowledge.is_forbidden(candidate, target)
    }

    fn is_required(&self, candidate: usize, target: usize) -> bool {
        self.knowledge.is_required(candidate, target)
    }

    /// Required parents among `candidates`, plus (when scoring backward)
    /// every other admissible candidate.
    fn initial_parents(&self, target: usize, candidates: &[usize]) -> Vec<usize> {
        candidates
            .iter()
            .copied()
            .filter(|&z| {
                self.is_required(z, target) || (self.backward && self.admissible(z, target))
            })
            .collect()
    }
}

/// The prefix in scan order: ascending variable index.
fn scan_order(prefix: &[usize]) -> Vec<usize> {
    let mut candidates = prefix.to_vec();
    candidates.sort_unstable();
    candidates
}

/// Parent-set selection for one position of an order.
pub trait ParentSetStrategy: Send + Sync {
    /// Number of variables the underlying oracle covers.
    fn num_variables(&self) -> usize;

    /// Select parents for `target` from `prefix` and score the result.
    ///
    /// Implementations must depend only on the set of variables in
    /// `prefix`, not on their order.
    fn grow_shrink(
        &self,
        target: usize,
        prefix: &[usize],
        rules: &GrowShrinkRules<'_>,
    ) -> PositionScore;
}

/// Grow-Shrink against a decomposable [`Score`].
pub struct ScoreStrategy<S> {
    score: S,
}

impl<S: Score> ScoreStrategy<S> {
    #[must_use]
    pub fn new(score: S) -> Self {
        Self { score }
    }
}

impl<S: Score> ParentSetStrategy for ScoreStrategy<S> {
    fn num_variables(&self) -> usize {
        self.score.num_variables()
    }

    fn grow_shrink(
        &self,
        target: usize,
        prefix: &[usize],
        rules: &GrowShrinkRules<'_>,
    ) -> PositionScore {
        let candidates = scan_order(prefix);
        let mut parents = rules.initial_parents(target, &candidates);
        let mut best = self.score.local_score(target, &parents);

        // Grow: add the single best candidate while it strictly improves.
        // NaN never compares greater, so inadmissible sets are never chosen.
        while !rules.at_cap(parents.len()) {
            let mut chosen = None;
            for &z in &candidates {
                if parents.contains(&z) || !rules.admissible(z, target) {
                    continue;
                }
                parents.push(z);
                let s = self.score.local_score(target, &parents);
                parents.pop();
                if s > best {
                    best = s;
                    chosen = Some(z);
                }
            }
            match chosen {
                Some(z) => parents.push(z),
                None => break,
            }
        }

        // Shrink: drop the single best removal while it strictly improves.
        let mut without = Vec::with_capacity(parents.len());
        loop {
            let mut chosen = None;
            for &z in &parents {
                if rules.is_required(z, target) {
                    continue;
                }
                without.clear();
                without.extend(parents.iter().copied().filter(|&p| p != z));
                let s = self.score.local_score(target, &without);
                if s > best {
                    best = s;
                    chosen = Some(z);
                }
            }
            match chosen {
                Some(z) => parents.retain(|&p| p != z),
                None => break,
            }
        }

        PositionScore::new(parents, best)
    }
}

/// Grow-Shrink against an [`IndependenceTest`]; scores `-|parents|`.
pub struct TestStrategy<T> {
    test: T,
}

impl<T: IndependenceTest> TestStrategy<T> {
    #[must_use]
    pub fn new(test: T) -> Self {
        Self { test }
    }
}

impl<T: IndependenceTest> ParentSetStrategy for TestStrategy<T> {
    fn num_variables(&self) -> usize {
        self.test.num_variables()
    }

    fn grow_shrink(
        &self,
        target: usize,
        prefix: &[usize],
        rules: &GrowShrinkRules<'_>,
    ) -> PositionScore {
        let candidates = scan_order(prefix);
        let mut parents = rules.initial_parents(target, &candidates);

        // Grow: sweep the prefix, adding every candidate still dependent on
        // the target given the parents so far; repeat until a sweep adds none.
        let mut changed = true;
        while changed {
            changed = false;
            for &z in &candidates {
                if rules.at_cap(parents.len()) {
                    break;
                }
                if parents.contains(&z) || !rules.admissible(z, target) {
                    continue;
                }
                if !self.test.is_independent(target, z, &parents) {
                    parents.push(z);
                    changed = true;
                }
            }
        }

        // Shrink: drop parents independent of the target given the rest.
        changed = true;
        while changed {
            changed = false;
            let mut i = 0;
            while i < parents.len() {
                let z = parents[i];
                if !rules.is_required(z, target) {
                    let rest: Vec<usize> = parents.iter().copied().filter(|&p| p != z).collect();
                    if self.test.is_independent(target, z, &rest) {
                        parents = rest;
                        changed = true;
                        continue;
                    }
                }
                i += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let score = -(parents.len() as f64);
        PositionScore::new(parents, score)
    }
}
