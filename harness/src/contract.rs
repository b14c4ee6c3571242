//! Scenario contract: the minimal trait a scenario must implement.
//!
//! Scenarios provide domain data only: variables, a ground-truth DAG, the
//! oracle to search with, a starting order and background knowledge.
//! Scenarios may NOT run searches, compute metrics or hash reports; those
//! are runner concerns.

use grasp_kernel::error::KernelError;
use grasp_kernel::graph::Dag;
use grasp_kernel::knowledge::Knowledge;
use grasp_kernel::variables::Variables;

/// Which oracle the runner builds from the ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OracleSpec {
    /// [`crate::oracles::TruthRewardScore`] over the truth.
    TruthReward,
    /// [`crate::oracles::ZeroScore`]: every parent set scores 0.
    Zero,
    /// [`crate::oracles::DSeparationTest`] over the truth, driving the
    /// independence-test strategy.
    DSeparation,
    /// Linear-Gaussian BIC over data simulated from the truth.
    SemBic {
        samples: usize,
        seed: u64,
        penalty_discount: f64,
    },
}

impl OracleSpec {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TruthReward => "truth_reward",
            Self::Zero => "zero",
            Self::DSeparation => "d_separation",
            Self::SemBic { .. } => "sem_bic",
        }
    }
}

/// The contract a scenario must implement to be run by the harness runner.
pub trait Scenario {
    /// Unique scenario identifier (e.g., `"reversed_chain"`).
    fn scenario_id(&self) -> &str;

    fn variables(&self) -> Variables;

    /// Ground truth; must have one node per variable.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfRange`] if an edge names a node
    /// outside the graph.
    fn truth(&self) -> Result<Dag, KernelError>;

    fn oracle(&self) -> OracleSpec;

    /// Order handed to the search as its data order.
    fn initial_order(&self) -> Vec<usize> {
        (0..self.variables().len()).collect()
    }

    /// Background knowledge. Unconstrained unless overridden.
    fn knowledge(&self) -> Knowledge {
        Knowledge::new()
    }
}
