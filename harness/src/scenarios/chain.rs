//! Four-variable chain `X1 → X2 → X3 → X4`.
//!
//! [`ReversedChain`] starts the search from the fully reversed order under
//! the truth-reward score; [`SemChain`] searches simulated linear-Gaussian
//! data with BIC.

use grasp_kernel::error::KernelError;
use grasp_kernel::graph::Dag;
use grasp_kernel::variables::Variables;

use crate::contract::{OracleSpec, Scenario};

const CHAIN_EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 3)];

fn chain() -> Result<Dag, KernelError> {
    Dag::from_edges(4, &CHAIN_EDGES)
}

/// Truth-reward search from `[X4, X3, X2, X1]`.
pub struct ReversedChain;

impl Scenario for ReversedChain {
    #[allow(clippy::unnecessary_literal_bound)]
    fn scenario_id(&self) -> &str {
        "reversed_chain"
    }

    fn variables(&self) -> Variables {
        Variables::numbered(4)
    }

    fn truth(&self) -> Result<Dag, KernelError> {
        chain()
    }

    fn oracle(&self) -> OracleSpec {
        OracleSpec::TruthReward
    }

    fn initial_order(&self) -> Vec<usize> {
        vec![3, 2, 1, 0]
    }
}

/// BIC search over data simulated from the chain.
pub struct SemChain {
    pub samples: usize,
    pub seed: u64,
}

impl Default for SemChain {
    fn default() -> Self {
        Self {
            samples: 2000,
            seed: 17,
        }
    }
}

impl Scenario for SemChain {
    #[allow(clippy::unnecessary_literal_bound)]
    fn scenario_id(&self) -> &str {
        "sem_chain"
    }

    fn variables(&self) -> Variables {
        Variables::numbered(4)
    }

    fn truth(&self) -> Result<Dag, KernelError> {
        chain()
    }

    fn oracle(&self) -> OracleSpec {
        OracleSpec::SemBic {
            samples: self.samples,
            seed: self.seed,
            penalty_discount: 1.0,
        }
    }

    fn initial_order(&self) -> Vec<usize> {
        vec![3, 2, 1, 0]
    }
}
