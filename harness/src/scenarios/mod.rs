//! Scenario implementations for the harness runner.

pub mod chain;
pub mod collider;
pub mod empty;
pub mod required_pair;

pub use chain::{ReversedChain, SemChain};
pub use collider::OracleCollider;
pub use empty::EmptyGraph;
pub use required_pair::RequiredPair;
