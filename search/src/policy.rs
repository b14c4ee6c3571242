//! Search policy types.

use crate::error::SearchError;

/// GRaSP configuration.
///
/// Depth fields are signed so that the "unbounded" convention of the
/// published algorithm carries over unchanged: `depth <= 0` and negative
/// `uncovered_depth` / `non_singular_depth` mean "no limit".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraspPolicy {
    /// Number of restarts. Must be at least 1.
    pub num_starts: usize,
    /// Use the caller's order (knowledge-sorted) on the first restart instead
    /// of a shuffle.
    pub use_data_order: bool,
    /// Recursion limit of the tuck DFS. `<= 0` is unbounded.
    pub depth: i32,
    /// Depth up to which uncovered tucks may be tried. `< 0` is unbounded,
    /// `0` restricts the search to covered tucks.
    pub uncovered_depth: i32,
    /// Depth up to which non-singular tucks may be kept. `< 0` is unbounded,
    /// `0` restricts the search to singular tucks.
    pub non_singular_depth: i32,
    /// Run the cheaper variants first (TSP, then ESP, then full GRaSP).
    /// When false only the full variant runs.
    pub ordered: bool,
    /// Upper bound on every parent set.
    pub max_indegree: Option<usize>,
    /// Grow-Shrink starts from the whole admissible prefix.
    pub backward_scoring: bool,
    /// Seed of the generator behind every shuffle.
    pub seed: u64,
    /// Memoize local scores across the whole search.
    pub cache_scores: bool,
}

impl Default for GraspPolicy {
    fn default() -> Self {
        Self {
            num_starts: 1,
            use_data_order: true,
            depth: 4,
            uncovered_depth: 1,
            non_singular_depth: 1,
            ordered: true,
            max_indegree: None,
            backward_scoring: false,
            seed: 0,
            cache_scores: true,
        }
    }
}

impl GraspPolicy {
    /// Pre-flight check.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if `num_starts` is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_starts == 0 {
            return Err(SearchError::InvalidPolicy {
                detail: "num_starts must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// The depth budgets of every variant this policy runs, cheapest first.
    #[must_use]
    pub fn variants(&self) -> Vec<DepthBudget> {
        let tuck = if self.depth < 1 {
            usize::MAX
        } else {
            unbounded_if_negative(self.depth)
        };
        let uncovered = unbounded_if_negative(self.uncovered_depth);
        let non_singular = unbounded_if_negative(self.non_singular_depth);

        let mut out = Vec::with_capacity(3);
        if self.ordered && self.uncovered_depth != 0 && self.non_singular_depth != 0 {
            out.push(DepthBudget {
                variant: Variant::Tsp,
                tuck,
                uncovered: 0,
                non_singular: 0,
            });
        }
        if self.ordered && self.non_singular_depth != 0 {
            out.push(DepthBudget {
                variant: Variant::Esp,
                tuck,
                uncovered,
                non_singular: 0,
            });
        }
        out.push(DepthBudget {
            variant: Variant::Grasp,
            tuck,
            uncovered,
            non_singular,
        });
        out
    }
}

fn unbounded_if_negative(d: i32) -> usize {
    usize::try_from(d).unwrap_or(usize::MAX)
}

/// Which tucks a variant may explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Covered, singular tucks only.
    Tsp,
    /// Adds uncovered tucks.
    Esp,
    /// Adds non-singular tucks.
    Grasp,
}

impl Variant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tsp => "grasp-tsp",
            Self::Esp => "grasp-esp",
            Self::Grasp => "grasp",
        }
    }
}

/// Resolved depth limits for one variant. `usize::MAX` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthBudget {
    pub variant: Variant,
    /// Recursion continues on plateaus while the current depth is below this.
    pub tuck: usize,
    /// Uncovered tucks are tried only at depths up to this.
    pub uncovered: usize,
    /// Non-singular tucks are kept only at depths up to this.
    pub non_singular: usize,
}
