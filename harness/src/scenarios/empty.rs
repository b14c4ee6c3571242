//! No true edges and a flat score: nothing to find.

use grasp_kernel::error::KernelError;
use grasp_kernel::graph::Dag;
use grasp_kernel::variables::Variables;

use crate::contract::{OracleSpec, Scenario};

pub struct EmptyGraph {
    pub n: usize,
}

impl Scenario for EmptyGraph {
    #[allow(clippy::unnecessary_literal_bound)]
    fn scenario_id(&self) -> &str {
        "empty_graph"
    }

    fn variables(&self) -> Variables {
        Variables::numbered(self.n)
    }

    fn truth(&self) -> Result<Dag, KernelError> {
        Ok(Dag::empty(self.n))
    }

    fn oracle(&self) -> OracleSpec {
        OracleSpec::Zero
    }
}
