//! Canonical JSON and content digests for search artifacts.
//!
//! Used by reports and determinism checks: two runs with the same seed and
//! inputs must produce byte-identical canonical JSON and therefore equal
//! digests.

pub mod canon;
pub mod hash;
