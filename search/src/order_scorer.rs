//! The order scorer: a permutation of the variables with one cached
//! Grow-Shrink result per position and an incrementally maintained total.
//!
//! # Invariants
//!
//! After every public mutating call returns:
//!
//! - `order` is a permutation of `0..n` and `positions[order[i]] == i`.
//! - `scores[i]` is the Grow-Shrink result for `order[i]` over `order[..i]`,
//!   so every parent precedes its child and the implied graph is acyclic.
//! - `running` equals the sum of `scores[i].score()`.
//!
//! Moving a variable only disturbs the prefixes of the positions between its
//! old and new index, so every edit re-runs Grow-Shrink on exactly that
//! range and adjusts `running` by the per-position delta.
//!
//! The one exception is [`OrderScorer::move_to_no_update`], which leaves the
//! position scores stale until the caller runs
//! [`OrderScorer::update_scores`] over the disturbed span.

use std::borrow::Cow;
use std::collections::BTreeSet;

use grasp_kernel::graph::Dag;
use grasp_kernel::knowledge::KnowledgeIndex;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::bookmark::{BookmarkKey, BookmarkStore, StateMut};
use crate::error::SearchError;
use crate::position::PositionScore;
use crate::score::{IndependenceTest, Score};
use crate::strategy::{GrowShrinkRules, ParentSetStrategy, ScoreStrategy, TestStrategy};

/// Marks a variable that has no position yet (before the first scoring).
const UNSCORED: usize = usize::MAX;

/// Permutation scorer with incremental Grow-Shrink maintenance.
///
/// Not thread-safe: one instance per search thread. Independent restarts
/// each own their scorer.
pub struct OrderScorer<'a> {
    strategy: Box<dyn ParentSetStrategy + 'a>,
    knowledge: Cow<'a, KnowledgeIndex>,
    max_indegree: Option<usize>,
    backward: bool,
    order: Vec<usize>,
    scores: Vec<PositionScore>,
    positions: Vec<usize>,
    running: f64,
    bookmarks: BookmarkStore,
}

impl<'a> OrderScorer<'a> {
    /// Scorer over an explicit parent-selection strategy.
    #[must_use]
    pub fn new(strategy: Box<dyn ParentSetStrategy + 'a>) -> Self {
        let n = strategy.num_variables();
        Self {
            strategy,
            knowledge: Cow::Owned(KnowledgeIndex::unconstrained(n)),
            max_indegree: None,
            backward: false,
            order: Vec::new(),
            scores: Vec::new(),
            positions: vec![UNSCORED; n],
            running: 0.0,
            bookmarks: BookmarkStore::default(),
        }
    }

    /// Scorer driven by a local score.
    #[must_use]
    pub fn from_score(score: &'a dyn Score) -> Self {
        Self::new(Box::new(ScoreStrategy::new(score)))
    }

    /// Scorer driven by an independence test; positions score `-|parents|`.
    #[must_use]
    pub fn from_test(test: &'a dyn IndependenceTest) -> Self {
        Self::new(Box::new(TestStrategy::new(test)))
    }

    /// Consult `knowledge` for parent admissibility and order validity.
    #[must_use]
    pub fn with_knowledge(mut self, knowledge: &'a KnowledgeIndex) -> Self {
        self.knowledge = Cow::Borrowed(knowledge);
        self
    }

    /// Cap every parent set at `cap` members (grow stops at the cap).
    #[must_use]
    pub fn with_max_indegree(mut self, cap: Option<usize>) -> Self {
        self.max_indegree = cap;
        self
    }

    /// Start Grow-Shrink from the whole admissible prefix.
    #[must_use]
    pub fn with_backward_scoring(mut self, backward: bool) -> Self {
        self.backward = backward;
        self
    }

    /// Number of variables the strategy covers.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeIndex {
        &self.knowledge
    }

    fn rules(&self) -> GrowShrinkRules<'_> {
        GrowShrinkRules {
            knowledge: &self.knowledge,
            max_indegree: self.max_indegree,
            backward: self.backward,
        }
    }

    // -----------------------------------------------------------------------
    // Full scoring
    // -----------------------------------------------------------------------

    /// Replace the order, clear bookmarks and score every position.
    ///
    /// Returns the total score. Calling twice with the same order yields the
    /// same state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidOrder`] unless `order` is a permutation
    /// of `0..num_variables()`.
    pub fn score_order(&mut self, order: &[usize]) -> Result<f64, SearchError> {
        validate_permutation(order, self.num_variables())?;
        self.order = order.to_vec();
        for (i, &v) in self.order.iter().enumerate() {
            self.positions[v] = i;
        }
        self.bookmarks.clear();
        self.scores = (0..self.order.len()).map(|p| self.grow_shrink(p)).collect();
        self.running = self.scores.iter().map(PositionScore::score).sum();
        Ok(self.running)
    }

    /// Running total of all position scores.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.running
    }

    /// Sum of Grow-Shrink scores recomputed from scratch for the current
    /// order. Equals [`OrderScorer::score`] whenever the invariants hold.
    #[must_use]
    pub fn recomputed_score(&self) -> f64 {
        (0..self.order.len())
            .map(|p| self.grow_shrink(p).score())
            .sum()
    }

    /// Grow-Shrink for the variable at `position` over its current prefix.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[must_use]
    pub fn grow_shrink(&self, position: usize) -> PositionScore {
        let target = self.order[position];
        self.strategy
            .grow_shrink(target, &self.order[..position], &self.rules())
    }

    /// Recompute positions `i1..=i2` (clamped to the order) and adjust the
    /// running score by each position's delta.
    pub fn update_scores(&mut self, i1: usize, i2: usize) {
        if self.order.is_empty() || i1 > i2 {
            return;
        }
        let hi = i2.min(self.order.len() - 1);
        for i in i1..=hi {
            self.positions[self.order[i]] = i;
        }
        let mut needs_resum = false;
        for i in i1..=hi {
            let fresh = self.grow_shrink(i);
            let old = std::mem::replace(&mut self.scores[i], fresh).score();
            let new = self.scores[i].score();
            if old.is_finite() && new.is_finite() {
                self.running += new - old;
            } else {
                needs_resum = true;
            }
        }
        if needs_resum {
            self.running = self.scores.iter().map(PositionScore::score).sum();
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The current permutation.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Variable at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[must_use]
    pub fn get(&self, position: usize) -> usize {
        self.order[position]
    }

    /// Position of `v`, or `None` if `v` has never been scored.
    #[must_use]
    pub fn try_index(&self, v: usize) -> Option<usize> {
        self.positions.get(v).copied().filter(|&p| p != UNSCORED)
    }

    /// Position of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not part of a scored order. Asking for the position
    /// of a variable the scorer never saw is a caller bug.
    #[must_use]
    pub fn index(&self, v: usize) -> usize {
        match self.try_index(v) {
            Some(p) => p,
            None => panic!(
                "variable {v} has no position: score_order() was not called with it \
                 ({} variables scored)",
                self.order.len()
            ),
        }
    }

    /// Cached Grow-Shrink result at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[must_use]
    pub fn position_score(&self, position: usize) -> &PositionScore {
        &self.scores[position]
    }

    /// Current parents of `v`, sorted.
    ///
    /// # Panics
    ///
    /// Panics if `v` has never been scored.
    #[must_use]
    pub fn parents(&self, v: usize) -> &[usize] {
        self.scores[self.index(v)].parents()
    }

    /// Parent list for every variable, indexed by variable.
    #[must_use]
    pub fn parent_sets(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.num_variables()];
        for (p, &v) in self.order.iter().enumerate() {
            out[v] = self.scores[p].parents().to_vec();
        }
        out
    }

    /// Number of parent relations across all positions.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.scores.iter().map(|s| s.parents().len()).sum()
    }

    /// The DAG implied by the current order and parent sets.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Knowledge`] if a parent index falls outside
    /// the variables, which a strategy honoring the prefix never produces.
    pub fn to_dag(&self) -> Result<Dag, SearchError> {
        Ok(Dag::from_parent_sets(self.parent_sets())?)
    }

    /// Whether `a` is a parent of `b` or `b` a parent of `a`.
    #[must_use]
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.scores[self.index(b)].has_parent(a) || self.scores[self.index(a)].has_parent(b)
    }

    /// Whether `x → y` is covered: adjacent, and `pa(x) \ {y} == pa(y) \ {x}`.
    #[must_use]
    pub fn covered_edge(&self, x: usize, y: usize) -> bool {
        if !self.adjacent(x, y) {
            return false;
        }
        let px = self.parents(x).iter().filter(|&&p| p != y);
        let py = self.parents(y).iter().filter(|&&p| p != x);
        px.eq(py)
    }

    /// `v` together with every variable reachable from it through parent
    /// links.
    #[must_use]
    pub fn ancestors(&self, v: usize) -> BTreeSet<usize> {
        let mut seen = vec![false; self.num_variables()];
        self.collect_ancestors(v, &mut seen);
        seen.iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect()
    }

    fn collect_ancestors(&self, v: usize, seen: &mut [bool]) {
        if seen[v] {
            return;
        }
        seen[v] = true;
        for &p in self.parents(v) {
            self.collect_ancestors(p, seen);
        }
    }

    /// A shuffled copy of the current order.
    pub fn shuffled_variables<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut vars = self.order.clone();
        vars.shuffle(rng);
        vars
    }

    /// Whether the current order breaks a precedence constraint.
    #[must_use]
    pub fn violates_knowledge(&self) -> bool {
        self.knowledge.violates_order(&self.order)
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Move `v` to `to` and rescore the disturbed range. No-op if already there.
    ///
    /// # Panics
    ///
    /// Panics if `v` has never been scored or `to >= self.len()`.
    pub fn move_to(&mut self, v: usize, to: usize) {
        let from = self.index(v);
        if from == to {
            return;
        }
        self.move_to_no_update(v, to);
        self.update_scores(from.min(to), from.max(to));
    }

    /// Move `v` to `to` without rescoring.
    ///
    /// Position scores in the disturbed range are stale afterwards; the
    /// caller must follow up with [`OrderScorer::update_scores`] covering
    /// every disturbed position before reading scores or parents.
    ///
    /// # Panics
    ///
    /// Panics if `v` has never been scored or `to >= self.len()`.
    pub fn move_to_no_update(&mut self, v: usize, to: usize) {
        let from = self.index(v);
        if from == to {
            return;
        }
        self.order.remove(from);
        self.order.insert(to, v);
        for i in from.min(to)..=from.max(to) {
            self.positions[self.order[i]] = i;
        }
    }

    /// Exchange the positions of `m` and `n`.
    ///
    /// Returns `false` (and leaves the state unchanged) if the swapped order
    /// would break a precedence constraint.
    ///
    /// # Panics
    ///
    /// Panics if either variable has never been scored.
    pub fn swap(&mut self, m: usize, n: usize) -> bool {
        let (i, j) = (self.index(m), self.index(n));
        if i == j {
            return true;
        }
        self.order.swap(i, j);
        if self.violates_knowledge() {
            self.order.swap(i, j);
            trace!(m, n, "swap rejected by knowledge");
            return false;
        }
        self.update_scores(i.min(j), i.max(j));
        true
    }

    /// Tuck `k` to position `j`: every ancestor of `k` found in
    /// `(j, index(k)]`, `k` included, moves (in order) to start at `j`,
    /// pushing the former occupant of `j` behind them.
    ///
    /// Returns `false` without changes unless `j < index(k)` and `k` is
    /// adjacent to the variable at `j`. The pre-tuck state is bookmarked
    /// under [`BookmarkKey::Tuck`]. Knowledge is not checked here; callers
    /// test [`OrderScorer::violates_knowledge`] once after the whole tuck.
    ///
    /// # Panics
    ///
    /// Panics if `k` has never been scored.
    pub fn tuck(&mut self, k: usize, j: usize) -> bool {
        let kidx = self.index(k);
        if j >= kidx || !self.adjacent(k, self.order[j]) {
            return false;
        }
        let ancestors = self.ancestors(k);
        self.tuck_ancestors(k, j, &ancestors);
        true
    }

    /// Tuck with a precomputed ancestor set of `k` (which must contain `k`).
    pub(crate) fn tuck_ancestors(&mut self, k: usize, j: usize, ancestors: &BTreeSet<usize>) {
        let kidx = self.index(k);
        self.bookmark(BookmarkKey::Tuck);
        let mut cursor = j;
        for i in (j + 1)..=kidx {
            let v = self.order[i];
            if ancestors.contains(&v) {
                self.move_to_no_update(v, cursor);
                cursor += 1;
            }
        }
        self.update_scores(j, kidx);
    }

    // -----------------------------------------------------------------------
    // Bookmarks
    // -----------------------------------------------------------------------

    /// Snapshot the current state under `key`, replacing any earlier one.
    pub fn bookmark(&mut self, key: BookmarkKey) {
        self.bookmarks.save(
            key,
            &self.order,
            &self.scores,
            &self.positions,
            self.running,
        );
    }

    /// Restore the state saved under `key`. The bookmark is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingBookmark`] if nothing is stored under `key`.
    pub fn go_to_bookmark(&mut self, key: BookmarkKey) -> Result<(), SearchError> {
        let restored = self.bookmarks.restore(
            key,
            StateMut {
                order: &mut self.order,
                scores: &mut self.scores,
                positions: &mut self.positions,
                running: &mut self.running,
            },
        )?;
        if let Some((lo, hi)) = restored {
            trace!(?key, lo, hi, "restored bookmark");
        }
        Ok(())
    }

    #[must_use]
    pub fn has_bookmark(&self, key: BookmarkKey) -> bool {
        self.bookmarks.contains(key)
    }

    /// Number of stored bookmarks.
    #[must_use]
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    /// Drop the bookmark under `key`. Returns whether one existed.
    pub fn clear_bookmark(&mut self, key: BookmarkKey) -> bool {
        self.bookmarks.remove(key)
    }

    pub fn clear_bookmarks(&mut self) {
        self.bookmarks.clear();
    }
}

/// Check that `order` is a permutation of `0..n`.
///
/// # Errors
///
/// Returns [`SearchError::InvalidOrder`] describing the first problem found.
pub fn validate_permutation(order: &[usize], n: usize) -> Result<(), SearchError> {
    if order.len() != n {
        return Err(SearchError::InvalidOrder {
            detail: format!("expected {n} variables, got {}", order.len()),
        });
    }
    let mut seen = vec![false; n];
    for &v in order {
        if v >= n {
            return Err(SearchError::InvalidOrder {
                detail: format!("variable index {v} out of range for {n} variables"),
            });
        }
        if std::mem::replace(&mut seen[v], true) {
            return Err(SearchError::InvalidOrder {
                detail: format!("variable index {v} appears more than once"),
            });
        }
    }
    Ok(())
}
