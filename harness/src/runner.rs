//! Harness runner: builds the oracle a scenario names, runs the search and
//! packages the result as a digest-bound report.
//!
//! The runner uses ONLY search and kernel APIs. It does not implement any
//! search logic itself.
//!
//! # Pipeline
//!
//! ```text
//! variables() → knowledge().resolve() → build oracle (simulate if SEM)
//!   → GraspSearch::best_order() → to_cpdag(knowledge)
//!   → metrics vs truth CPDAG → order / graph / report digests
//! ```

use grasp_kernel::digest::canon::canonical_json_bytes;
use grasp_kernel::digest::hash::{canonical_hash, ContentHash, DOMAIN_RUN_REPORT};
use grasp_kernel::error::KernelError;
use grasp_kernel::graph::{Cpdag, Dag};
use grasp_kernel::knowledge::KnowledgeIndex;
use grasp_kernel::variables::Variables;
use grasp_search::cancel::CancelFlag;
use grasp_search::error::SearchError;
use grasp_search::grasp::{GraspSearch, SearchOutcome};
use grasp_search::materialize::{cpdag_json, format_score, graph_digest};
use grasp_search::policy::GraspPolicy;
use grasp_search::score::Score;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::bic::SemBicScore;
use crate::contract::{OracleSpec, Scenario};
use crate::metrics::Metrics;
use crate::oracles::{DSeparationTest, TruthRewardScore, ZeroScore};
use crate::sem;

/// Error during a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The scenario's pieces disagree with each other.
    #[error("scenario {scenario_id}: {detail}")]
    InvalidScenario { scenario_id: String, detail: String },

    /// Data simulation or score construction failed.
    #[error("simulation failed: {detail}")]
    Simulation { detail: String },

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Everything one scenario run produced, minus its own digest.
#[derive(Debug, Clone)]
pub struct ReportBody {
    pub scenario_id: String,
    pub variables: Variables,
    pub policy: GraspPolicy,
    pub oracle: OracleSpec,
    pub outcome: SearchOutcome,
    /// Estimated equivalence class, knowledge applied.
    pub cpdag: Cpdag,
    /// Against the truth's equivalence class under the same knowledge.
    pub metrics: Metrics,
    pub order_digest: ContentHash,
    pub graph_digest: ContentHash,
}

impl ReportBody {
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "scenario_id": self.scenario_id,
            "oracle": self.oracle.as_str(),
            "policy": policy_json(&self.policy),
            "outcome": self.outcome.to_json(&self.variables),
            "cpdag": cpdag_json(&self.cpdag, &self.variables),
            "metrics": self.metrics.to_json(),
            "order_digest": self.order_digest.as_str(),
            "graph_digest": self.graph_digest.as_str(),
        })
    }
}

/// A report body bound to the digest of its canonical JSON.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub body: ReportBody,
    pub report_digest: ContentHash,
}

impl RunReport {
    /// Seal `body` under [`DOMAIN_RUN_REPORT`].
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Kernel`] if the body does not canonicalize.
    pub fn seal(body: ReportBody) -> Result<Self, RunError> {
        let bytes = canonical_json_bytes(&body.to_json())?;
        Ok(Self {
            report_digest: canonical_hash(DOMAIN_RUN_REPORT, &bytes),
            body,
        })
    }

    /// The full report, digest included.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut v = self.body.to_json();
        if let Value::Object(map) = &mut v {
            map.insert(
                "report_digest".into(),
                Value::String(self.report_digest.as_str().to_string()),
            );
        }
        v
    }
}

fn policy_json(p: &GraspPolicy) -> Value {
    json!({
        "num_starts": p.num_starts,
        "use_data_order": p.use_data_order,
        "depth": p.depth,
        "uncovered_depth": p.uncovered_depth,
        "non_singular_depth": p.non_singular_depth,
        "ordered": p.ordered,
        "max_indegree": p.max_indegree,
        "backward_scoring": p.backward_scoring,
        "seed": p.seed,
        "cache_scores": p.cache_scores,
    })
}

/// Run `scenario` under `policy`.
///
/// # Errors
///
/// Returns [`RunError`] if the scenario is inconsistent, its knowledge is
/// contradictory, data simulation fails, or the search rejects its inputs.
pub fn run_scenario(scenario: &dyn Scenario, policy: &GraspPolicy) -> Result<RunReport, RunError> {
    run_scenario_with_cancel(scenario, policy, CancelFlag::new())
}

/// [`run_scenario`] with an external cancel flag.
///
/// # Errors
///
/// See [`run_scenario`].
pub fn run_scenario_with_cancel(
    scenario: &dyn Scenario,
    policy: &GraspPolicy,
    cancel: CancelFlag,
) -> Result<RunReport, RunError> {
    let scenario_id = scenario.scenario_id().to_string();
    let variables = scenario.variables();
    let truth = scenario.truth()?;
    if truth.len() != variables.len() {
        return Err(RunError::InvalidScenario {
            scenario_id,
            detail: format!(
                "truth has {} nodes for {} variables",
                truth.len(),
                variables.len()
            ),
        });
    }
    let knowledge = scenario.knowledge().resolve(&variables)?;
    let initial = scenario.initial_order();
    let oracle = scenario.oracle();
    info!(scenario = %scenario_id, oracle = oracle.as_str(), "running scenario");

    let outcome = match oracle {
        OracleSpec::DSeparation => {
            let test = DSeparationTest::new(truth.clone());
            GraspSearch::with_test(&test, policy.clone())
                .with_knowledge(&knowledge)
                .with_cancel(cancel)
                .best_order(&initial)?
        }
        OracleSpec::TruthReward | OracleSpec::Zero | OracleSpec::SemBic { .. } => {
            let score = build_score(oracle, &truth)?;
            search_with_score(score.as_ref(), policy, &knowledge, cancel, &initial)?
        }
    };

    let cpdag = outcome.to_cpdag(Some(&knowledge))?.graph;
    let truth_cpdag = Cpdag::from_dag_with_knowledge(&truth, &knowledge);
    let metrics = Metrics::compare(&cpdag, &truth_cpdag);
    let order_digest = outcome.order_digest(&variables)?;
    let graph_digest = graph_digest(&cpdag_json(&cpdag, &variables))?;

    let report = RunReport::seal(ReportBody {
        scenario_id,
        variables,
        policy: policy.clone(),
        oracle,
        outcome,
        cpdag,
        metrics,
        order_digest,
        graph_digest,
    })?;

    info!(
        scenario = %report.body.scenario_id,
        score = %format_score(report.body.outcome.score),
        edges = report.body.outcome.num_edges(),
        shd = report.body.metrics.shd,
        digest = %report.report_digest,
        "scenario finished"
    );
    Ok(report)
}

fn build_score(oracle: OracleSpec, truth: &Dag) -> Result<Box<dyn Score>, RunError> {
    let score: Box<dyn Score> = match oracle {
        OracleSpec::TruthReward => Box::new(TruthRewardScore::new(truth.clone())),
        OracleSpec::Zero => Box::new(ZeroScore::new(truth.len())),
        OracleSpec::SemBic {
            samples,
            seed,
            penalty_discount,
        } => {
            let data = sem::simulate(truth, samples, seed)?;
            Box::new(SemBicScore::from_dataset(&data, penalty_discount)?)
        }
        OracleSpec::DSeparation => {
            return Err(RunError::Simulation {
                detail: "d-separation is a test, not a score".into(),
            });
        }
    };
    Ok(score)
}

fn search_with_score(
    score: &dyn Score,
    policy: &GraspPolicy,
    knowledge: &KnowledgeIndex,
    cancel: CancelFlag,
    initial: &[usize],
) -> Result<SearchOutcome, SearchError> {
    GraspSearch::with_score(score, policy.clone())
        .with_knowledge(knowledge)
        .with_cancel(cancel)
        .best_order(initial)
}
