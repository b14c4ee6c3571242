//! GRaSP Kernel: the data model shared by every layer of the workspace.
//!
//! # API Surface
//!
//! - [`variables::Variables`] -- names ↔ dense indices
//! - [`knowledge::Knowledge`] / [`knowledge::KnowledgeIndex`] -- forbidden,
//!   required and tiered constraints, resolved to O(1) index queries
//! - [`graph::Dag`] / [`graph::Cpdag`] -- search output graphs, d-separation,
//!   Meek orientation
//! - [`digest`] -- canonical JSON bytes and SHA-256 content hashes
//!
//! # Module Dependency Direction
//!
//! `variables` ← `knowledge` ← `graph`; `digest` depends on nothing internal.
//! The kernel contains no search logic.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod digest;
pub mod error;
pub mod graph;
pub mod knowledge;
pub mod variables;
