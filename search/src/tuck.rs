//! Tuck descriptors and the tabu memory of one DFS call chain.

use std::collections::{BTreeSet, HashSet};

/// "Pull parent `x` in front of `y`", identified by its unordered pair.
///
/// The pair is stored low-high, so the tucks `x → y` and `y → x` share a
/// key; once either has been tried on the current DFS path, both are tabu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tuck {
    lo: usize,
    hi: usize,
}

impl Tuck {
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            lo: x.min(y),
            hi: x.max(y),
        }
    }

    #[must_use]
    pub fn pair(self) -> (usize, usize) {
        (self.lo, self.hi)
    }
}

/// Active tucks on the current path plus every active set already explored.
///
/// Scoped to a single top-level DFS call; a fresh memory is built for each.
#[derive(Debug, Default)]
pub struct TuckMemory {
    active: BTreeSet<Tuck>,
    history: HashSet<BTreeSet<Tuck>>,
}

impl TuckMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `tuck` is already on the current path.
    #[must_use]
    pub fn is_active(&self, tuck: Tuck) -> bool {
        self.active.contains(&tuck)
    }

    /// Push `tuck` onto the path if the resulting active set has not been
    /// explored before. Returns `false` (leaving the path unchanged) if it has.
    pub fn enter(&mut self, tuck: Tuck) -> bool {
        if !self.active.insert(tuck) {
            return false;
        }
        if self.history.insert(self.active.clone()) {
            true
        } else {
            self.active.remove(&tuck);
            false
        }
    }

    /// Pop `tuck` from the path. Its set stays in the history.
    pub fn leave(&mut self, tuck: Tuck) {
        self.active.remove(&tuck);
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Number of distinct active sets explored so far.
    #[must_use]
    pub fn explored(&self) -> usize {
        self.history.len()
    }
}
