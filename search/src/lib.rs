//! GRaSP Search: permutation-based causal structure search.
//!
//! This crate holds the search core. It depends only on `grasp_kernel`; it
//! does NOT depend on `grasp_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! grasp_kernel  ←  grasp_search  ←  grasp_harness
//! (data model)     (scorer, DFS)    (oracles, SEM, runner)
//! ```
//!
//! # Key types
//!
//! - [`Score`] / [`IndependenceTest`] -- the oracles a search consumes
//! - [`OrderScorer`] -- a permutation with incrementally maintained
//!   Grow-Shrink parent sets, bookmarks and tucks
//! - [`GraspSearch`] -- restarts, TSP / ESP / GRaSP variants and the tuck DFS
//! - [`GraspPolicy`] -- search configuration
//! - [`SearchOutcome`] -- final order and parents, convertible to a DAG or
//!   CPDAG with an attached score

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bookmark;
pub mod cancel;
pub mod error;
pub mod grasp;
pub mod materialize;
pub mod order_scorer;
pub mod policy;
pub mod position;
pub mod score;
pub mod strategy;
pub mod tuck;

pub use bookmark::BookmarkKey;
pub use cancel::CancelFlag;
pub use error::SearchError;
pub use grasp::{GraspSearch, SearchOutcome, TerminationReason};
pub use materialize::ScoredGraph;
pub use order_scorer::OrderScorer;
pub use policy::GraspPolicy;
pub use position::PositionScore;
pub use score::{CachedScore, IndependenceTest, Score};
pub use strategy::{ParentSetStrategy, ScoreStrategy, TestStrategy};
