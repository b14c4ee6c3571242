//! Two variables whose score prefers `X1 → X2` while knowledge requires
//! `X2 → X1`.

use grasp_kernel::error::KernelError;
use grasp_kernel::graph::Dag;
use grasp_kernel::knowledge::Knowledge;
use grasp_kernel::variables::Variables;

use crate::contract::{OracleSpec, Scenario};

pub struct RequiredPair;

impl Scenario for RequiredPair {
    #[allow(clippy::unnecessary_literal_bound)]
    fn scenario_id(&self) -> &str {
        "required_pair"
    }

    fn variables(&self) -> Variables {
        Variables::numbered(2)
    }

    fn truth(&self) -> Result<Dag, KernelError> {
        Dag::from_edges(2, &[(0, 1)])
    }

    fn oracle(&self) -> OracleSpec {
        OracleSpec::TruthReward
    }

    fn knowledge(&self) -> Knowledge {
        let mut k = Knowledge::new();
        k.require("X2", "X1");
        k
    }
}
