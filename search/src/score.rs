//! Oracle contracts consumed by the search, and a memoizing score wrapper.

use std::collections::HashMap;
use std::sync::Mutex;

/// Decomposable local score. Higher is better.
///
/// `local_score` must be a pure function of its arguments for a fixed
/// underlying dataset. NaN or `-inf` marks an inadmissible parent set; such
/// a set is never selected as an improvement.
pub trait Score: Send + Sync {
    /// Number of variables the score is defined over.
    fn num_variables(&self) -> usize;

    /// Score of `target` given exactly the parents in `parents`.
    ///
    /// `parents` never contains `target` and never contains duplicates; its
    /// order carries no meaning.
    fn local_score(&self, target: usize, parents: &[usize]) -> f64;
}

/// Conditional independence oracle.
pub trait IndependenceTest: Send + Sync {
    /// Number of variables the test is defined over.
    fn num_variables(&self) -> usize;

    /// Whether `x ⟂ y | z`.
    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool;
}

impl<S: Score + ?Sized> Score for &S {
    fn num_variables(&self) -> usize {
        (**self).num_variables()
    }

    fn local_score(&self, target: usize, parents: &[usize]) -> f64 {
        (**self).local_score(target, parents)
    }
}

impl<T: IndependenceTest + ?Sized> IndependenceTest for &T {
    fn num_variables(&self) -> usize {
        (**self).num_variables()
    }

    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool {
        (**self).is_independent(x, y, z)
    }
}

/// Memoizes `(target, sorted parents) → score` for an inner [`Score`].
///
/// Grow-Shrink re-evaluates the same parent sets many times across tucks and
/// bookmark restores; the cache turns those repeats into map lookups.
pub struct CachedScore<S> {
    inner: S,
    cache: Mutex<HashMap<(usize, Vec<usize>), f64>>,
}

impl<S: Score> CachedScore<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct `(target, parents)` entries memoized so far.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map_or(0, |c| c.len())
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Score> Score for CachedScore<S> {
    fn num_variables(&self) -> usize {
        self.inner.num_variables()
    }

    fn local_score(&self, target: usize, parents: &[usize]) -> f64 {
        let mut key_parents = parents.to_vec();
        key_parents.sort_unstable();
        let key = (target, key_parents);
        if let Ok(cache) = self.cache.lock() {
            if let Some(&s) = cache.get(&key) {
                return s;
            }
        }
        let s = self.inner.local_score(target, parents);
        // A poisoned lock only loses memoization, never correctness.
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, s);
        }
        s
    }
}
