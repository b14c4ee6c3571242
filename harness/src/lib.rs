//! GRaSP Harness: scenario-level orchestration for the search.
//!
//! The harness builds ground-truth oracles and simulated data for a
//! scenario, runs the search, scores the recovered graph against the truth
//! and binds the result to a content digest.
//!
//! The harness does NOT implement search logic; it delegates to
//! `grasp_search`. Scenarios provide domain data only; the harness owns
//! orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bic;
pub mod contract;
pub mod metrics;
pub mod oracles;
pub mod runner;
pub mod scenarios;
pub mod sem;
