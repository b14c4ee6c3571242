//! Turning a search outcome into graphs, JSON and content digests.
//!
//! Scores are rendered as fixed six-decimal strings so that canonical JSON
//! (integers only) can carry them and digests stay stable.

use grasp_kernel::digest::canon::canonical_json_bytes;
use grasp_kernel::digest::hash::{canonical_hash, ContentHash, DOMAIN_GRAPH, DOMAIN_ORDER};
use grasp_kernel::graph::{Cpdag, Dag, Edge};
use grasp_kernel::knowledge::KnowledgeIndex;
use grasp_kernel::variables::Variables;
use serde_json::{json, Value};

use crate::error::SearchError;
use crate::grasp::SearchOutcome;

/// A graph with the score of the order it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGraph<G> {
    pub graph: G,
    pub score: f64,
}

impl SearchOutcome {
    /// DAG with an edge `p → v` for every recorded parent `p` of `v`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Knowledge`] if a parent index is out of range.
    pub fn to_dag(&self) -> Result<ScoredGraph<Dag>, SearchError> {
        Ok(ScoredGraph {
            graph: Dag::from_parent_sets(self.parents.clone())?,
            score: self.score,
        })
    }

    /// Equivalence class of [`SearchOutcome::to_dag`], with knowledge
    /// orientations applied on top of Meek's rules when given.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Knowledge`] if a parent index is out of range.
    pub fn to_cpdag(
        &self,
        knowledge: Option<&KnowledgeIndex>,
    ) -> Result<ScoredGraph<Cpdag>, SearchError> {
        let dag = self.to_dag()?.graph;
        let graph = match knowledge {
            Some(k) => Cpdag::from_dag_with_knowledge(&dag, k),
            None => Cpdag::from_dag(&dag),
        };
        Ok(ScoredGraph {
            graph,
            score: self.score,
        })
    }

    /// The outcome as JSON, with variables by name.
    #[must_use]
    pub fn to_json(&self, variables: &Variables) -> Value {
        let edges: Vec<Value> = self
            .parents
            .iter()
            .enumerate()
            .flat_map(|(child, ps)| {
                ps.iter()
                    .map(move |&p| json!([name(variables, p), name(variables, child)]))
            })
            .collect();
        json!({
            "order": variables.render(&self.order),
            "edges": edges,
            "score": format_score(self.score),
            "restarts_completed": self.restarts_completed,
            "termination": self.termination.as_str(),
        })
    }

    /// Digest of the final order alone.
    ///
    /// # Errors
    ///
    /// Never fails for rendered outcomes; the error path is canonical JSON
    /// rejecting a non-integer number.
    pub fn order_digest(&self, variables: &Variables) -> Result<ContentHash, SearchError> {
        let bytes = canonical_json_bytes(&json!(variables.render(&self.order)))?;
        Ok(canonical_hash(DOMAIN_ORDER, &bytes))
    }
}

fn name(variables: &Variables, v: usize) -> String {
    variables
        .name(v)
        .map_or_else(|| format!("#{v}"), str::to_string)
}

/// Fixed-precision rendering of a score.
#[must_use]
pub fn format_score(score: f64) -> String {
    if score.is_finite() {
        format!("{score:.6}")
    } else if score.is_nan() {
        "nan".into()
    } else if score > 0.0 {
        "inf".into()
    } else {
        "-inf".into()
    }
}

/// `[from, to]` name pairs of a DAG, in edge order.
#[must_use]
pub fn dag_json(dag: &Dag, variables: &Variables) -> Value {
    let edges: Vec<Value> = dag
        .edges()
        .into_iter()
        .map(|(from, to)| json!([name(variables, from), "-->", name(variables, to)]))
        .collect();
    json!({ "kind": "dag", "edges": edges })
}

/// Directed edges as `[from, "-->", to]`, undirected as `[a, "---", b]`.
#[must_use]
pub fn cpdag_json(cpdag: &Cpdag, variables: &Variables) -> Value {
    let edges: Vec<Value> = cpdag
        .edges()
        .into_iter()
        .map(|e| match e {
            Edge::Directed { from, to } => {
                json!([name(variables, from), "-->", name(variables, to)])
            }
            Edge::Undirected { a, b } => json!([name(variables, a), "---", name(variables, b)]),
        })
        .collect();
    json!({ "kind": "cpdag", "edges": edges })
}

/// Digest of a rendered graph.
///
/// # Errors
///
/// Returns [`SearchError::Knowledge`] if the JSON holds a non-integer number.
pub fn graph_digest(rendered: &Value) -> Result<ContentHash, SearchError> {
    let bytes = canonical_json_bytes(rendered)?;
    Ok(canonical_hash(DOMAIN_GRAPH, &bytes))
}
