//! Partially directed graphs: the Markov-equivalence-class representative
//! of a DAG (CPDAG) and the knowledge-constrained variant of it.

use std::collections::BTreeMap;

use crate::graph::dag::Dag;
use crate::graph::meek;
use crate::knowledge::KnowledgeIndex;

/// Mark on the edge between `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mark {
    Undirected,
    /// `lo → hi`
    Forward,
    /// `hi → lo`
    Backward,
}

/// An edge of a partially directed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Edge {
    /// `from → to`
    Directed { from: usize, to: usize },
    /// `a — b` with `a < b`
    Undirected { a: usize, b: usize },
}

impl Edge {
    /// Endpoints as `(min, max)`.
    #[must_use]
    pub fn endpoints(&self) -> (usize, usize) {
        match *self {
            Self::Directed { from, to } => (from.min(to), from.max(to)),
            Self::Undirected { a, b } => (a, b),
        }
    }
}

/// A graph with directed and undirected edges and no multi-edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cpdag {
    n: usize,
    edges: BTreeMap<(usize, usize), Mark>,
}

fn key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

impl Cpdag {
    /// Graph with `n` nodes and no edges.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            edges: BTreeMap::new(),
        }
    }

    /// Equivalence-class representative of `dag`.
    ///
    /// Keeps the skeleton, orients unshielded colliders, then closes under
    /// Meek's rules.
    #[must_use]
    pub fn from_dag(dag: &Dag) -> Self {
        let mut g = Self::empty(dag.len());
        for (from, to) in dag.edges() {
            g.add_undirected(from, to);
        }
        for c in 0..dag.len() {
            let ps = dag.parents(c);
            for (i, &a) in ps.iter().enumerate() {
                for &b in &ps[i + 1..] {
                    if !dag.is_adjacent(a, b) {
                        g.orient(a, c);
                        g.orient(b, c);
                    }
                }
            }
        }
        meek::apply_meek_rules(&mut g);
        g
    }

    /// Equivalence-class representative of `dag`, with the orientations
    /// forced by `knowledge` applied and propagated.
    #[must_use]
    pub fn from_dag_with_knowledge(dag: &Dag, knowledge: &KnowledgeIndex) -> Self {
        let mut g = Self::from_dag(dag);
        if g.apply_knowledge(knowledge) {
            meek::apply_meek_rules(&mut g);
        }
        g
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Insert `a — b`, replacing any existing mark.
    pub fn add_undirected(&mut self, a: usize, b: usize) {
        if a != b {
            self.edges.insert(key(a, b), Mark::Undirected);
        }
    }

    /// Set the edge between `from` and `to` to `from → to`, inserting it if absent.
    pub fn orient(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let mark = if from < to {
            Mark::Forward
        } else {
            Mark::Backward
        };
        self.edges.insert(key(from, to), mark);
    }

    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&key(a, b))
    }

    /// Whether the graph contains exactly `from → to`.
    #[must_use]
    pub fn is_directed(&self, from: usize, to: usize) -> bool {
        let want = if from < to {
            Mark::Forward
        } else {
            Mark::Backward
        };
        self.edges.get(&key(from, to)) == Some(&want)
    }

    #[must_use]
    pub fn is_undirected(&self, a: usize, b: usize) -> bool {
        self.edges.get(&key(a, b)) == Some(&Mark::Undirected)
    }

    /// Nodes sharing an edge with `v`, ascending.
    #[must_use]
    pub fn adjacent_nodes(&self, v: usize) -> Vec<usize> {
        self.edges
            .keys()
            .filter_map(|&(a, b)| {
                if a == v {
                    Some(b)
                } else if b == v {
                    Some(a)
                } else {
                    None
                }
            })
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All edges, sorted by endpoints.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|(&(lo, hi), mark)| match mark {
                Mark::Undirected => Edge::Undirected { a: lo, b: hi },
                Mark::Forward => Edge::Directed { from: lo, to: hi },
                Mark::Backward => Edge::Directed { from: hi, to: lo },
            })
            .collect()
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn num_undirected(&self) -> usize {
        self.edges
            .values()
            .filter(|m| **m == Mark::Undirected)
            .count()
    }

    /// Orient undirected edges as `knowledge` dictates.
    ///
    /// `a — b` becomes `a → b` when `a → b` is required, or when `b → a` is
    /// forbidden and `a → b` is not. Returns whether anything changed.
    pub fn apply_knowledge(&mut self, knowledge: &KnowledgeIndex) -> bool {
        if knowledge.is_empty() {
            return false;
        }
        let undirected: Vec<(usize, usize)> = self
            .edges
            .iter()
            .filter(|(_, m)| **m == Mark::Undirected)
            .map(|(&k, _)| k)
            .collect();
        let mut changed = false;
        for (a, b) in undirected {
            if knowledge.must_precede(a, b) {
                self.orient(a, b);
                changed = true;
            } else if knowledge.must_precede(b, a) {
                self.orient(b, a);
                changed = true;
            }
        }
        changed
    }
}
