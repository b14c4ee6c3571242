//! Typed search errors.
//!
//! `SearchError` covers caller mistakes and unsatisfiable inputs. Score
//! degeneracies (NaN, -inf) and knowledge-violating tucks are handled inside
//! the search and never surface here; cancellation is reported through
//! [`crate::grasp::TerminationReason`], not as an error.

use grasp_kernel::error::KernelError;
use thiserror::Error;

use crate::bookmark::BookmarkKey;

/// Typed failure for search setup and scorer input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// An order is not a permutation of `0..expected`.
    #[error("invalid order: {detail}")]
    InvalidOrder { detail: String },

    /// `go_to_bookmark` was called with a key that was never bookmarked
    /// (or was cleared).
    #[error("no bookmark stored under {key:?}")]
    MissingBookmark { key: BookmarkKey },

    /// Two inputs disagree on the number of variables.
    #[error("{what} covers {actual} variables, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A policy field is out of range.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },

    /// Knowledge failed to resolve or admits no valid order.
    #[error(transparent)]
    Knowledge(#[from] KernelError),
}
