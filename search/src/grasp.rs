//! GRaSP driver: restarts, depth-tiered variants and the tuck DFS.
//!
//! Each restart picks a starting order (the caller's on the first restart
//! when `use_data_order` is set, otherwise a shuffle), makes it consistent
//! with knowledge, and runs every variant of the policy in turn. A variant
//! repeats its DFS until a pass ends without a strict improvement. The best
//! order over all restarts is re-scored and returned.
//!
//! # Score comparison
//!
//! The running score is maintained by deltas, so two states with the same
//! true score can differ in the last bits. Improvements must clear a
//! relative tolerance of `1e-9`, and anything within it counts as a tie
//! (a plateau move).
//!
//! # Randomness
//!
//! Variable and parent visiting order is shuffled on every DFS pass by a
//! `ChaCha8Rng` seeded from the policy. Grow-Shrink itself never
//! randomizes; which parent wins a tie depends on the prefix the shuffled
//! search happens to produce. Fixed seed and inputs give a fixed outcome.

use grasp_kernel::knowledge::KnowledgeIndex;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::bookmark::BookmarkKey;
use crate::cancel::CancelFlag;
use crate::error::SearchError;
use crate::order_scorer::{validate_permutation, OrderScorer};
use crate::policy::{DepthBudget, GraspPolicy};
use crate::score::{CachedScore, IndependenceTest, Score};
use crate::strategy::ScoreStrategy;
use crate::tuck::{Tuck, TuckMemory};

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every restart ran to convergence.
    Converged,
    /// The cancel flag was raised; the outcome is the best found so far.
    Cancelled,
    /// Zero or one variable: nothing to search.
    Trivial,
}

impl TerminationReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Cancelled => "cancelled",
            Self::Trivial => "trivial",
        }
    }
}

/// Final order, its parent sets and score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best permutation found.
    pub order: Vec<usize>,
    /// Parents of each variable, indexed by variable, sorted.
    pub parents: Vec<Vec<usize>>,
    /// Total score of `order`.
    pub score: f64,
    /// Restarts that ran to convergence.
    pub restarts_completed: usize,
    pub termination: TerminationReason,
}

impl SearchOutcome {
    /// Number of parent relations.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }
}

#[derive(Clone, Copy)]
enum Oracle<'a> {
    Score(&'a dyn Score),
    Test(&'a dyn IndependenceTest),
}

impl Oracle<'_> {
    fn num_variables(self) -> usize {
        match self {
            Self::Score(s) => s.num_variables(),
            Self::Test(t) => t.num_variables(),
        }
    }
}

/// How one DFS level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DfsExit {
    Improved,
    Exhausted,
    Cancelled,
}

/// Permutation search over tucks.
pub struct GraspSearch<'a> {
    oracle: Oracle<'a>,
    knowledge: Option<&'a KnowledgeIndex>,
    policy: GraspPolicy,
    cancel: CancelFlag,
}

impl<'a> GraspSearch<'a> {
    /// Search driven by a local score.
    #[must_use]
    pub fn with_score(score: &'a dyn Score, policy: GraspPolicy) -> Self {
        Self::build(Oracle::Score(score), policy)
    }

    /// Search driven by an independence test (positions score `-|parents|`).
    #[must_use]
    pub fn with_test(test: &'a dyn IndependenceTest, policy: GraspPolicy) -> Self {
        Self::build(Oracle::Test(test), policy)
    }

    fn build(oracle: Oracle<'a>, policy: GraspPolicy) -> Self {
        Self {
            oracle,
            knowledge: None,
            policy,
            cancel: CancelFlag::new(),
        }
    }

    /// Respect `knowledge` in parent selection and order validity.
    #[must_use]
    pub fn with_knowledge(mut self, knowledge: &'a KnowledgeIndex) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Poll `cancel` at every restart and every variable of a DFS pass.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &GraspPolicy {
        &self.policy
    }

    #[must_use]
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Run the search from `initial`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidPolicy`] if the policy fails validation.
    /// - [`SearchError::InvalidOrder`] if `initial` is not a permutation of
    ///   the oracle's variables.
    /// - [`SearchError::SizeMismatch`] if the knowledge covers a different
    ///   number of variables than the oracle.
    /// - [`SearchError::Knowledge`] if the knowledge admits no valid order.
    pub fn best_order(&self, initial: &[usize]) -> Result<SearchOutcome, SearchError> {
        self.policy.validate()?;
        let n = self.oracle.num_variables();
        validate_permutation(initial, n)?;

        let unconstrained;
        let knowledge = if let Some(k) = self.knowledge {
            if k.len() != n {
                return Err(SearchError::SizeMismatch {
                    what: "knowledge",
                    expected: n,
                    actual: k.len(),
                });
            }
            k
        } else {
            unconstrained = KnowledgeIndex::unconstrained(n);
            &unconstrained
        };

        let cached;
        let scorer = match self.oracle {
            Oracle::Score(score) if self.policy.cache_scores => {
                cached = CachedScore::new(score);
                OrderScorer::new(Box::new(ScoreStrategy::new(&cached)))
            }
            Oracle::Score(score) => OrderScorer::from_score(score),
            Oracle::Test(test) => OrderScorer::from_test(test),
        };
        let mut scorer = scorer
            .with_knowledge(knowledge)
            .with_max_indegree(self.policy.max_indegree)
            .with_backward_scoring(self.policy.backward_scoring);

        if n <= 1 {
            let order = knowledge.valid_order(initial)?;
            scorer.score_order(&order)?;
            return Ok(outcome(&scorer, 0, TerminationReason::Trivial));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.policy.seed);
        let mut best: Option<(Vec<usize>, f64)> = None;
        let mut completed = 0;
        let mut termination = TerminationReason::Converged;

        for restart in 0..self.policy.num_starts {
            if self.cancel.is_cancelled() {
                termination = TerminationReason::Cancelled;
                break;
            }
            let mut order = initial.to_vec();
            if restart > 0 || !self.policy.use_data_order {
                order.shuffle(&mut rng);
            }
            let order = knowledge.valid_order(&order)?;
            let start = scorer.score_order(&order)?;

            let finished = self.grasp(&mut scorer, &mut rng)?;
            let score = scorer.score();
            info!(restart, start, score, finished, "restart finished");

            if best.as_ref().map_or(true, |(_, b)| improves(score, *b)) {
                best = Some((scorer.order().to_vec(), score));
            }
            if !finished {
                termination = TerminationReason::Cancelled;
                break;
            }
            completed += 1;
        }

        let best_order = match best {
            Some((order, _)) => order,
            None => knowledge.valid_order(initial)?,
        };
        scorer.score_order(&best_order)?;
        let result = outcome(&scorer, completed, termination);
        info!(
            score = result.score,
            edges = result.num_edges(),
            restarts = completed,
            termination = termination.as_str(),
            "search finished"
        );
        Ok(result)
    }

    /// Every variant to convergence. Returns `false` if cancelled.
    fn grasp(
        &self,
        scorer: &mut OrderScorer<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool, SearchError> {
        for budget in self.policy.variants() {
            debug!(
                variant = budget.variant.as_str(),
                score = scorer.score(),
                "starting variant"
            );
            loop {
                let s_old = scorer.score();
                let mut memory = TuckMemory::new();
                let exit = self.dfs(scorer, s_old, &budget, 1, &mut memory, rng)?;
                if exit == DfsExit::Cancelled {
                    return Ok(false);
                }
                if !improves(scorer.score(), s_old) {
                    break;
                }
            }
        }
        Ok(true)
    }

    /// One level of the tuck DFS.
    ///
    /// Leaves the scorer either strictly better than `s_old` (returning
    /// `Improved`), restored to its state on entry (`Exhausted`), or wherever
    /// the search stood when cancelled.
    fn dfs(
        &self,
        scorer: &mut OrderScorer<'_>,
        s_old: f64,
        budget: &DepthBudget,
        depth: usize,
        memory: &mut TuckMemory,
        rng: &mut ChaCha8Rng,
    ) -> Result<DfsExit, SearchError> {
        let key = BookmarkKey::Depth(depth);
        for y in scorer.shuffled_variables(rng) {
            if self.cancel.is_cancelled() {
                return Ok(DfsExit::Cancelled);
            }
            let mut parents = scorer.parents(y).to_vec();
            parents.shuffle(rng);

            for x in parents {
                let tuck = Tuck::new(x, y);
                if memory.is_active(tuck) {
                    continue;
                }
                let covered = scorer.covered_edge(x, y);
                if depth > budget.uncovered && !covered {
                    continue;
                }

                let j = scorer.index(x);
                let ancestors = scorer.ancestors(y);
                let singular = is_singular(scorer, x, y, &ancestors);

                scorer.bookmark(key);
                scorer.tuck_ancestors(y, j, &ancestors);

                if depth > budget.non_singular && !singular {
                    scorer.go_to_bookmark(key)?;
                    continue;
                }
                if scorer.violates_knowledge() {
                    trace!(x, y, depth, "tuck rejected by knowledge");
                    scorer.go_to_bookmark(key)?;
                    continue;
                }

                let s_new = scorer.score();
                if improves(s_new, s_old) {
                    debug!(
                        x,
                        y,
                        depth,
                        covered,
                        old = s_old,
                        new = s_new,
                        "accepted tuck"
                    );
                    return Ok(DfsExit::Improved);
                }

                if ties(s_new, s_old) && depth < budget.tuck && memory.enter(tuck) {
                    let exit = self.dfs(scorer, s_old, budget, depth + 1, memory, rng)?;
                    memory.leave(tuck);
                    if exit != DfsExit::Exhausted {
                        return Ok(exit);
                    }
                }

                scorer.go_to_bookmark(key)?;
            }
        }
        Ok(DfsExit::Exhausted)
    }
}

/// A tuck of `y` in front of its parent `x` is singular unless some ancestor
/// of `y` strictly between them is itself a child of `x`.
fn is_singular(
    scorer: &OrderScorer<'_>,
    x: usize,
    y: usize,
    ancestors: &std::collections::BTreeSet<usize>,
) -> bool {
    let (lo, hi) = (scorer.index(x), scorer.index(y));
    ((lo + 1)..hi)
        .map(|i| scorer.get(i))
        .filter(|z| ancestors.contains(z))
        .all(|z| !scorer.parents(z).contains(&x))
}

fn tolerance(reference: f64) -> f64 {
    1e-9 * reference.abs().max(1.0)
}

/// `new` beats `old` by more than the tolerance.
fn improves(new: f64, old: f64) -> bool {
    if old.is_finite() {
        new > old + tolerance(old)
    } else {
        new > old
    }
}

/// `new` is within the tolerance of `old`.
fn ties(new: f64, old: f64) -> bool {
    if old.is_finite() && new.is_finite() {
        (new - old).abs() <= tolerance(old)
    } else {
        new == old
    }
}

fn outcome(
    scorer: &OrderScorer<'_>,
    restarts_completed: usize,
    termination: TerminationReason,
) -> SearchOutcome {
    SearchOutcome {
        order: scorer.order().to_vec(),
        parents: scorer.parent_sets(),
        score: scorer.score(),
        restarts_completed,
        termination,
    }
}
