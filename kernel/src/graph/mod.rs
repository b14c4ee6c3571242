//! Graph types produced by a search: DAGs, CPDAGs, and the orientation rules
//! that connect them.

pub mod cpdag;
pub mod dag;
pub mod meek;

pub use cpdag::{Cpdag, Edge};
pub use dag::Dag;
