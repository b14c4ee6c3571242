//! Keyed snapshots of scorer state with diff-based save and restore.
//!
//! A snapshot holds the order, the per-position scores, the variable →
//! position index and the running score. Re-bookmarking an existing key, or
//! restoring one, copies only the index range `[lo, hi]` spanning every
//! position where the live state and the snapshot disagree. Because both
//! sides are permutations of the same variables, positions outside that
//! range are identical and the position index only needs refreshing inside it.

use std::collections::HashMap;

use crate::error::SearchError;
use crate::position::PositionScore;

/// Identifier of a stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookmarkKey {
    /// One per recursion depth of the tuck DFS.
    Depth(usize),
    /// Reserved for [`crate::order_scorer::OrderScorer::tuck`].
    Tuck,
    /// Free for callers.
    Named(u32),
}

/// Mutable scorer state, borrowed as one unit for save/restore.
pub(crate) struct StateMut<'s> {
    pub order: &'s mut [usize],
    pub scores: &'s mut [PositionScore],
    pub positions: &'s mut [usize],
    pub running: &'s mut f64,
}

#[derive(Debug, Clone)]
struct Snapshot {
    order: Vec<usize>,
    scores: Vec<PositionScore>,
    positions: Vec<usize>,
    running: f64,
}

/// Keyed snapshots. Never expire; callers clear them.
#[derive(Debug, Clone, Default)]
pub(crate) struct BookmarkStore {
    snapshots: HashMap<BookmarkKey, Snapshot>,
}

/// Smallest `[lo, hi]` covering every position where the two states differ.
fn changed_range(
    a_order: &[usize],
    a_scores: &[PositionScore],
    b_order: &[usize],
    b_scores: &[PositionScore],
) -> Option<(usize, usize)> {
    let differs = |i: usize| a_order[i] != b_order[i] || a_scores[i] != b_scores[i];
    let n = a_order.len();
    let lo = (0..n).find(|&i| differs(i))?;
    let hi = (lo..n).rev().find(|&i| differs(i)).unwrap_or(lo);
    Some((lo, hi))
}

impl BookmarkStore {
    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub(crate) fn remove(&mut self, key: BookmarkKey) -> bool {
        self.snapshots.remove(&key).is_some()
    }

    pub(crate) fn contains(&self, key: BookmarkKey) -> bool {
        self.snapshots.contains_key(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Store the live state under `key`, copying only what changed if the
    /// key already holds a snapshot of the same size.
    pub(crate) fn save(
        &mut self,
        key: BookmarkKey,
        order: &[usize],
        scores: &[PositionScore],
        positions: &[usize],
        running: f64,
    ) {
        match self.snapshots.get_mut(&key) {
            Some(snap) if snap.order.len() == order.len() => {
                if let Some((lo, hi)) = changed_range(&snap.order, &snap.scores, order, scores) {
                    snap.order[lo..=hi].copy_from_slice(&order[lo..=hi]);
                    snap.scores[lo..=hi].clone_from_slice(&scores[lo..=hi]);
                    for &v in &order[lo..=hi] {
                        snap.positions[v] = positions[v];
                    }
                }
                snap.running = running;
            }
            _ => {
                self.snapshots.insert(
                    key,
                    Snapshot {
                        order: order.to_vec(),
                        scores: scores.to_vec(),
                        positions: positions.to_vec(),
                        running,
                    },
                );
            }
        }
    }

    /// Overwrite the live state with the snapshot under `key`.
    ///
    /// Returns the restored range, or `None` if nothing differed.
    pub(crate) fn restore(
        &self,
        key: BookmarkKey,
        state: StateMut<'_>,
    ) -> Result<Option<(usize, usize)>, SearchError> {
        let snap = self
            .snapshots
            .get(&key)
            .ok_or(SearchError::MissingBookmark { key })?;
        if snap.order.len() != state.order.len() {
            return Err(SearchError::InvalidOrder {
                detail: format!(
                    "bookmark {key:?} holds {} variables, scorer holds {}",
                    snap.order.len(),
                    state.order.len()
                ),
            });
        }
        let range = changed_range(state.order, state.scores, &snap.order, &snap.scores);
        if let Some((lo, hi)) = range {
            state.order[lo..=hi].copy_from_slice(&snap.order[lo..=hi]);
            state.scores[lo..=hi].clone_from_slice(&snap.scores[lo..=hi]);
            for &v in &snap.order[lo..=hi] {
                state.positions[v] = snap.positions[v];
            }
        }
        *state.running = snap.running;
        Ok(range)
    }
}
