//! Per-position Grow-Shrink result.

/// The best parent set found for the variable at one position of the order,
/// restricted to the prefix before it, and its local score.
///
/// Immutable once built. Parents are kept sorted so two results for the same
/// set compare equal regardless of discovery order. A NaN score is stored as
/// `-inf` so running sums and equality stay well defined.
#[derive(Debug, Clone)]
pub struct PositionScore {
    parents: Vec<usize>,
    score: f64,
}

impl PositionScore {
    #[must_use]
    pub fn new(mut parents: Vec<usize>, score: f64) -> Self {
        parents.sort_unstable();
        parents.dedup();
        let score = if score.is_nan() {
            f64::NEG_INFINITY
        } else {
            score
        };
        Self { parents, score }
    }

    /// Sorted parent indices.
    #[must_use]
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn has_parent(&self, v: usize) -> bool {
        self.parents.binary_search(&v).is_ok()
    }
}

/// Bitwise score equality: a restored snapshot must match exactly.
impl PartialEq for PositionScore {
    fn eq(&self, other: &Self) -> bool {
        self.score.to_bits() == other.score.to_bits() && self.parents == other.parents
    }
}

impl Eq for PositionScore {}
