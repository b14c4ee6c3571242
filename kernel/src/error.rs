//! Typed kernel errors.
//!
//! Every variant names the offending input so a caller can report it without
//! re-deriving context.

use thiserror::Error;

/// Failure while building or resolving kernel data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// A name was registered twice in the same [`crate::variables::Variables`].
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// Knowledge or an order refers to a name that is not registered.
    #[error("unknown variable name: {name}")]
    UnknownVariable { name: String },

    /// A variable index is outside `0..len`.
    #[error("variable index {index} out of range for {len} variables")]
    IndexOutOfRange { index: usize, len: usize },

    /// Required/forbidden constraints admit no total order.
    ///
    /// `unordered` lists the variables that were still waiting on a
    /// predecessor when the sort stalled.
    #[error("contradictory knowledge: no total order satisfies the constraints on {unordered:?}")]
    ContradictoryKnowledge { unordered: Vec<String> },

    /// A JSON number was not an integer (float, NaN, Infinity).
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
}
