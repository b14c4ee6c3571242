//! Background knowledge: forbidden / required directed edges and tiers.
//!
//! [`Knowledge`] is written against variable names and is what callers build.
//! Search code never consults it directly; it consults the index-based
//! [`KnowledgeIndex`] produced by [`Knowledge::resolve`], which answers every
//! pair query in O(1).
//!
//! # Tier semantics
//!
//! Tiers are numbered from 0. A variable in a later tier may not be a parent
//! of a variable in an earlier tier. A tier flagged "forbidden within tier"
//! additionally forbids edges between its own members in both directions.
//! Variables in no tier are unconstrained by tiers.
//!
//! # Ordering semantics
//!
//! `a` must precede `b` in any valid order when `a → b` is required, or when
//! `b → a` is forbidden but `a → b` is not. A pair forbidden in both
//! directions constrains adjacency only, never order.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::KernelError;
use crate::variables::Variables;

/// One tier of the temporal ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tier {
    members: BTreeSet<String>,
    forbidden_within: bool,
}

/// Name-level background knowledge. Read-only once handed to a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Knowledge {
    forbidden: BTreeSet<(String, String)>,
    required: BTreeSet<(String, String)>,
    tiers: BTreeMap<usize, Tier>,
}

impl Knowledge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no edge or tier constraint has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
            && self.required.is_empty()
            && self.tiers.values().all(|t| t.members.is_empty())
    }

    /// Forbid the directed edge `from → to`.
    pub fn forbid(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.forbidden.insert((from.into(), to.into()));
        self
    }

    /// Require the directed edge `from → to`.
    pub fn require(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.required.insert((from.into(), to.into()));
        self
    }

    /// Place `name` in `tier`, removing it from any other tier.
    pub fn add_to_tier(&mut self, tier: usize, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        for t in self.tiers.values_mut() {
            t.members.remove(&name);
        }
        self.tiers.entry(tier).or_default().members.insert(name);
        self
    }

    /// Forbid (or re-allow) edges between members of `tier`.
    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) -> &mut Self {
        self.tiers.entry(tier).or_default().forbidden_within = forbidden;
        self
    }

    /// Tier holding `name`, if any.
    #[must_use]
    pub fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers
            .iter()
            .find(|(_, t)| t.members.contains(name))
            .map(|(&i, _)| i)
    }

    /// Whether `from → to` is forbidden, explicitly or by tiers.
    #[must_use]
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if self.forbidden.contains(&(from.to_string(), to.to_string())) {
            return true;
        }
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(tf), Some(tt)) if tf > tt => true,
            (Some(tf), Some(tt)) if tf == tt => self
                .tiers
                .get(&tf)
                .is_some_and(|t| t.forbidden_within && from != to),
            _ => false,
        }
    }

    /// Whether `from → to` is required.
    #[must_use]
    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    /// Explicitly forbidden edges, sorted.
    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Required edges, sorted.
    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Resolve every constraint against `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnknownVariable`] if any edge or tier names a
    /// variable that is not registered.
    pub fn resolve(&self, variables: &Variables) -> Result<KnowledgeIndex, KernelError> {
        let mut index = KnowledgeIndex::unconstrained_named(variables.names().to_vec());
        if self.is_empty() {
            return Ok(index);
        }
        index.empty = false;

        for (a, b) in self.forbidden_edges().chain(self.required_edges()) {
            variables.require(a)?;
            variables.require(b)?;
        }
        for t in self.tiers.values() {
            for m in &t.members {
                variables.require(m)?;
            }
        }

        let n = variables.len();
        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let (na, nb) = (&variables.names()[a], &variables.names()[b]);
                index.forbidden[a * n + b] = self.is_forbidden(na, nb);
                if self.is_required(na, nb) {
                    index.required[a * n + b] = true;
                    index.required_parents[b].push(a);
                }
            }
        }
        Ok(index)
    }
}

/// Index-based, O(1) view of [`Knowledge`] for a fixed [`Variables`] registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeIndex {
    names: Vec<String>,
    empty: bool,
    forbidden: Vec<bool>,
    required: Vec<bool>,
    required_parents: Vec<Vec<usize>>,
}

impl KnowledgeIndex {
    /// Knowledge with no constraints over `n` variables.
    #[must_use]
    pub fn unconstrained(n: usize) -> Self {
        Self::unconstrained_named((0..n).map(|i| format!("#{i}")).collect())
    }

    fn unconstrained_named(names: Vec<String>) -> Self {
        let n = names.len();
        Self {
            names,
            empty: true,
            forbidden: vec![false; n * n],
            required: vec![false; n * n],
            required_parents: vec![Vec::new(); n],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether `from → to` is forbidden. Out-of-range indices are unconstrained.
    #[must_use]
    pub fn is_forbidden(&self, from: usize, to: usize) -> bool {
        let n = self.names.len();
        from < n && to < n && self.forbidden[from * n + to]
    }

    /// Whether `from → to` is required. Out-of-range indices are unconstrained.
    #[must_use]
    pub fn is_required(&self, from: usize, to: usize) -> bool {
        let n = self.names.len();
        from < n && to < n && self.required[from * n + to]
    }

    /// Variables with a required edge into `node`, ascending.
    #[must_use]
    pub fn required_parents(&self, node: usize) -> &[usize] {
        self.required_parents
            .get(node)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether every valid order places `a` before `b`.
    #[must_use]
    pub fn must_precede(&self, a: usize, b: usize) -> bool {
        self.is_required(a, b) || (self.is_forbidden(b, a) && !self.is_forbidden(a, b))
    }

    /// Whether `order` places some variable before one that must precede it.
    #[must_use]
    pub fn violates_order(&self, order: &[usize]) -> bool {
        if self.empty {
            return false;
        }
        for (i, &earlier) in order.iter().enumerate() {
            for &later in &order[i + 1..] {
                if self.must_precede(later, earlier) {
                    return true;
                }
            }
        }
        false
    }

    /// Stable knowledge-consistent reordering of `order`.
    ///
    /// Repeatedly emits the earliest variable of `order` none of whose
    /// required predecessors is still pending. Incomparable variables keep
    /// their relative input order.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ContradictoryKnowledge`] when the precedence
    /// constraints are cyclic.
    pub fn valid_order(&self, order: &[usize]) -> Result<Vec<usize>, KernelError> {
        if self.empty {
            return Ok(order.to_vec());
        }
        let mut pending: Vec<usize> = order.to_vec();
        let mut out = Vec::with_capacity(order.len());
        while !pending.is_empty() {
            let next = pending.iter().position(|&v| {
                pending
                    .iter()
                    .all(|&u| u == v || !self.must_precede(u, v))
            });
            let Some(pos) = next else {
                let unordered = pending
                    .iter()
                    .map(|&v| self.names.get(v).cloned().unwrap_or_else(|| format!("#{v}")))
                    .collect();
                return Err(KernelError::ContradictoryKnowledge { unordered });
            };
            out.push(pending.remove(pos));
        }
        Ok(out)
    }
}
