//! Meek's orientation rules, applied to a fixpoint.
//!
//! For an undirected edge `a — b`, orient `a → b` when:
//!
//! 1. some `c → a` exists with `c` not adjacent to `b`;
//! 2. some `c` has `a → c → b`;
//! 3. two non-adjacent `c`, `d` have `a — c → b` and `a — d → b`;
//! 4. some `c`, `d` have `a — c → d → b` with `c` not adjacent to `b` and
//!    `a` adjacent to `d`.

use crate::graph::cpdag::{Cpdag, Edge};

/// Apply rules 1–4 until no edge changes. Returns the number of edges oriented.
pub fn apply_meek_rules(g: &mut Cpdag) -> usize {
    let mut oriented = 0;
    loop {
        let mut changed = false;
        let undirected: Vec<(usize, usize)> = g
            .edges()
            .into_iter()
            .filter_map(|e| match e {
                Edge::Undirected { a, b } => Some((a, b)),
                Edge::Directed { .. } => None,
            })
            .collect();
        for (a, b) in undirected {
            if !g.is_undirected(a, b) {
                continue;
            }
            if should_orient(g, a, b) {
                g.orient(a, b);
                changed = true;
                oriented += 1;
            } else if should_orient(g, b, a) {
                g.orient(b, a);
                changed = true;
                oriented += 1;
            }
        }
        if !changed {
            return oriented;
        }
    }
}

fn should_orient(g: &Cpdag, a: usize, b: usize) -> bool {
    rule1(g, a, b) || rule2(g, a, b) || rule3(g, a, b) || rule4(g, a, b)
}

fn rule1(g: &Cpdag, a: usize, b: usize) -> bool {
    g.adjacent_nodes(a)
        .into_iter()
        .any(|c| c != b && g.is_directed(c, a) && !g.is_adjacent(c, b))
}

fn rule2(g: &Cpdag, a: usize, b: usize) -> bool {
    g.adjacent_nodes(a)
        .into_iter()
        .any(|c| c != b && g.is_directed(a, c) && g.is_directed(c, b))
}

fn rule3(g: &Cpdag, a: usize, b: usize) -> bool {
    let into_b: Vec<usize> = g
        .adjacent_nodes(a)
        .into_iter()
        .filter(|&c| c != b && g.is_undirected(a, c) && g.is_directed(c, b))
        .collect();
    into_b.iter().enumerate().any(|(i, &c)| {
        into_b[i + 1..]
            .iter()
            .any(|&d| !g.is_adjacent(c, d))
    })
}

fn rule4(g: &Cpdag, a: usize, b: usize) -> bool {
    g.adjacent_nodes(a).into_iter().any(|c| {
        c != b
            && g.is_undirected(a, c)
            && !g.is_adjacent(c, b)
            && g.adjacent_nodes(c).into_iter().any(|d| {
                d != a && d != b && g.is_directed(c, d) && g.is_directed(d, b) && g.is_adjacent(a, d)
            })
    })
}
