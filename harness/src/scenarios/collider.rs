//! `X1 → X3 ← X2`, `X3 → X4`, searched with a d-separation oracle.
//!
//! The collider is identifiable, so the CPDAG is fully oriented.

use grasp_kernel::error::KernelError;
use grasp_kernel::graph::Dag;
use grasp_kernel::variables::Variables;

use crate::contract::{OracleSpec, Scenario};

pub struct OracleCollider;

impl Scenario for OracleCollider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn scenario_id(&self) -> &str {
        "oracle_collider"
    }

    fn variables(&self) -> Variables {
        Variables::numbered(4)
    }

    fn truth(&self) -> Result<Dag, KernelError> {
        Dag::from_edges(4, &[(0, 2), (1, 2), (2, 3)])
    }

    fn oracle(&self) -> OracleSpec {
        OracleSpec::DSeparation
    }

    fn initial_order(&self) -> Vec<usize> {
        vec![3, 2, 1, 0]
    }
}
