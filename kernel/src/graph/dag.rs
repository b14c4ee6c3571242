//! Directed acyclic graph over dense variable indices.

use std::collections::{BTreeSet, VecDeque};

use crate::error::KernelError;

/// A directed graph stored as a sorted parent list per node.
///
/// Construction does not reject cycles; [`Dag::is_acyclic`] reports them.
/// Graphs produced from an order plus prefix-restricted parent sets are
/// acyclic by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Dag {
    parents: Vec<Vec<usize>>,
}

impl Dag {
    /// Graph with `n` nodes and no edges.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            parents: vec![Vec::new(); n],
        }
    }

    /// Build from one parent list per node.
    ///
    /// Parent lists are sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfRange`] if any parent index is not a
    /// node of the graph.
    pub fn from_parent_sets(mut parents: Vec<Vec<usize>>) -> Result<Self, KernelError> {
        let len = parents.len();
        for ps in &mut parents {
            if let Some(&index) = ps.iter().find(|&&p| p >= len) {
                return Err(KernelError::IndexOutOfRange { index, len });
            }
            ps.sort_unstable();
            ps.dedup();
        }
        Ok(Self { parents })
    }

    /// Build from a list of `(from, to)` edges.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfRange`] for an endpoint `>= n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, KernelError> {
        let mut dag = Self::empty(n);
        for &(from, to) in edges {
            dag.add_edge(from, to)?;
        }
        Ok(dag)
    }

    /// Add `from → to`. Returns `Ok(false)` if the edge already existed.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfRange`] for an endpoint `>= len`.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<bool, KernelError> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(KernelError::IndexOutOfRange { index, len });
            }
        }
        let ps = &mut self.parents[to];
        match ps.binary_search(&from) {
            Ok(_) => Ok(false),
            Err(pos) => {
                ps.insert(pos, from);
                Ok(true)
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Sorted parents of `node` (empty for out-of-range nodes).
    #[must_use]
    pub fn parents(&self, node: usize) -> &[usize] {
        self.parents.get(node).map_or(&[], Vec::as_slice)
    }

    /// Children of `node`, ascending.
    #[must_use]
    pub fn children(&self, node: usize) -> Vec<usize> {
        (0..self.len())
            .filter(|&c| self.parents[c].binary_search(&node).is_ok())
            .collect()
    }

    #[must_use]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.parents(to).binary_search(&from).is_ok()
    }

    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.has_edge(a, b) || self.has_edge(b, a)
    }

    /// All edges as `(from, to)`, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = self
            .parents
            .iter()
            .enumerate()
            .flat_map(|(to, ps)| ps.iter().map(move |&from| (from, to)))
            .collect();
        out.sort_unstable();
        out
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }

    /// Kahn topological order, or `None` if the graph has a directed cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.len();
        let children: Vec<Vec<usize>> = (0..n).map(|v| self.children(v)).collect();
        let mut indegree: Vec<usize> = self.parents.iter().map(Vec::len).collect();
        let mut ready: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(v) = ready.pop_front() {
            order.push(v);
            for &c in &children[v] {
                indegree[c] -= 1;
                if indegree[c] == 0 {
                    ready.push_back(c);
                }
            }
        }
        (order.len() == n).then_some(order)
    }

    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_some()
    }

    /// Proper ancestors of `node` (excluding `node` itself).
    #[must_use]
    pub fn ancestors(&self, node: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self.parents(node).to_vec();
        while let Some(v) = stack.pop() {
            if seen.insert(v) {
                stack.extend_from_slice(self.parents(v));
            }
        }
        seen.remove(&node);
        seen
    }

    /// Whether `x` and `y` are d-separated given `z`.
    ///
    /// Uses the reachability formulation: a trail from `x` is followed in
    /// (node, direction) states, passing a non-collider only when it is not
    /// conditioned on and a collider only when it is an ancestor of (or in)
    /// `z`. `x == y` is never separated; an endpoint inside `z` always is.
    #[must_use]
    pub fn is_d_separated(&self, x: usize, y: usize, z: &[usize]) -> bool {
        if x == y {
            return false;
        }
        let n = self.len();
        let mut in_z = vec![false; n];
        for &v in z {
            if v < n {
                in_z[v] = true;
            }
        }
        if x >= n || y >= n || in_z[x] || in_z[y] {
            return true;
        }

        // Z together with its ancestors: colliders in this set are open.
        let mut opens_collider = in_z.clone();
        let mut stack: Vec<usize> = z.iter().copied().filter(|&v| v < n).collect();
        while let Some(v) = stack.pop() {
            for &p in self.parents(v) {
                if !opens_collider[p] {
                    opens_collider[p] = true;
                    stack.push(p);
                }
            }
        }

        let children: Vec<Vec<usize>> = (0..n).map(|v| self.children(v)).collect();
        // State: (node, arrived_from_child). Arriving from a child means the
        // trail points up into `node`.
        let mut visited = vec![[false; 2]; n];
        let mut queue: VecDeque<(usize, bool)> = VecDeque::new();
        queue.push_back((x, true));
        while let Some((v, up)) = queue.pop_front() {
            if visited[v][usize::from(up)] {
                continue;
            }
            visited[v][usize::from(up)] = true;
            if v == y {
                return false;
            }
            if up {
                if !in_z[v] {
                    queue.extend(self.parents(v).iter().map(|&p| (p, true)));
                    queue.extend(children[v].iter().map(|&c| (c, false)));
                }
            } else {
                if !in_z[v] {
                    queue.extend(children[v].iter().map(|&c| (c, false)));
                }
                if opens_collider[v] {
                    queue.extend(self.parents(v).iter().map(|&p| (p, true)));
                }
            }
        }
        true
    }
}
