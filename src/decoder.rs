//! Maximum spanning arborescence search (Chu-Liu-Edmonds).
//!
//! The search is iterative: every contraction pushes one level onto an explicit stack, and the
//! expansion pops the levels back off.

use alloc::vec::Vec;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::errors::{Result, RudepError};
use crate::graph::CandidateGraph;
use crate::sentence::DependencyTree;

#[derive(Clone, Copy, Debug)]
struct Arc {
    head: usize,
    dep: usize,
    weight: f64,

    // Index of the arc on the level below. Unused on level 0.
    parent: usize,
}

/// One contracted level.
struct Contraction {
    arcs: Vec<Arc>,
    best_in: Vec<usize>,
    cycle: Vec<usize>,
    in_cycle: Vec<bool>,
}

/// Records which arc of a contracted cycle was dropped during expansion.
///
/// Node IDs are those of the level the cycle was found on. For the first contraction these are
/// token indices.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Expansion {
    pub cycle: Vec<usize>,
    pub broken: (usize, usize),
}

/// Returns the highest-scoring dependency tree over the edges of `graph`.
///
/// `score(head, dep)` is called once per candidate edge. Ties are resolved in favor of the edge
/// seen first, with edges visited by ascending head.
///
/// # Errors
///
/// Returns [`RudepError::NoArborescence`] when some token cannot be reached from the root, and
/// [`RudepError::InvalidArgument`] for a graph without the root node.
pub fn decode<F>(graph: &CandidateGraph, score: F) -> Result<DependencyTree>
where
    F: FnMut(usize, usize) -> f64,
{
    decode_with_trace(graph, score).map(|(tree, _)| tree)
}

/// Like [`decode()`], but also returns the expansion records from the innermost contraction
/// outwards.
pub(crate) fn decode_with_trace<F>(
    graph: &CandidateGraph,
    mut score: F,
) -> Result<(DependencyTree, Vec<Expansion>)>
where
    F: FnMut(usize, usize) -> f64,
{
    if graph.len() == 0 {
        return Err(RudepError::invalid_argument("graph has no root"));
    }
    let mut n_nodes = graph.len();
    let mut arcs: Vec<Arc> = graph
        .edges()
        .enumerate()
        .map(|(i, (head, dep))| Arc {
            head,
            dep,
            weight: score(head, dep),
            parent: i,
        })
        .collect();
    // Smallest token index in each node, used for error reports.
    let mut representatives: Vec<usize> = (0..n_nodes).collect();
    let mut stack: Vec<Contraction> = vec![];

    let best_in = loop {
        let best_in = best_incoming(n_nodes, &arcs, &representatives)?;
        let Some(cycle) = find_cycle(n_nodes, &arcs, &best_in) else {
            break best_in;
        };

        let mut in_cycle = vec![false; n_nodes];
        for &v in &cycle {
            in_cycle[v] = true;
        }
        let min_cycle_weight = cycle
            .iter()
            .map(|&v| arcs[best_in[v]].weight)
            .fold(f64::INFINITY, f64::min);

        // Nodes outside the cycle keep their relative order; the cycle becomes the last node.
        let mut node_map = vec![0; n_nodes];
        let mut next_representatives = vec![];
        for v in 0..n_nodes {
            if !in_cycle[v] {
                node_map[v] = next_representatives.len();
                next_representatives.push(representatives[v]);
            }
        }
        let super_node = next_representatives.len();
        next_representatives.push(
            cycle
                .iter()
                .map(|&v| representatives[v])
                .min()
                .unwrap_or(usize::MAX),
        );
        for &v in &cycle {
            node_map[v] = super_node;
        }

        let mut next_arcs: Vec<Arc> = vec![];
        let mut arc_ids: HashMap<(usize, usize), usize> = HashMap::new();
        for (i, arc) in arcs.iter().enumerate() {
            let head = node_map[arc.head];
            let dep = node_map[arc.dep];
            if head == dep {
                continue;
            }
            let weight = if in_cycle[arc.dep] {
                arc.weight - arcs[best_in[arc.dep]].weight + min_cycle_weight
            } else {
                arc.weight
            };
            let next = Arc {
                head,
                dep,
                weight,
                parent: i,
            };
            match arc_ids.entry((head, dep)) {
                Entry::Occupied(e) => {
                    let kept = &mut next_arcs[*e.get()];
                    if weight > kept.weight {
                        *kept = next;
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(next_arcs.len());
                    next_arcs.push(next);
                }
            }
        }

        stack.push(Contraction {
            arcs: core::mem::replace(&mut arcs, next_arcs),
            best_in,
            cycle,
            in_cycle,
        });
        n_nodes = super_node + 1;
        representatives = next_representatives;
    };

    // Arcs selected on the current level, indexed by dependent.
    let mut selected: Vec<Arc> = best_in.iter().skip(1).map(|&i| arcs[i]).collect();
    let mut expansions = vec![];
    while let Some(level) = stack.pop() {
        let mut next_selected = Vec::with_capacity(level.best_in.len());
        let mut entry_dep = None;
        for arc in &selected {
            let lower = level.arcs[arc.parent];
            if level.in_cycle[lower.dep] {
                entry_dep = Some(lower.dep);
            }
            next_selected.push(lower);
        }
        // Every arc entering the super-node maps to an arc entering the cycle.
        let Some(entry_dep) = entry_dep else {
            return Err(RudepError::no_arborescence(
                level.cycle.first().copied().unwrap_or(0),
            ));
        };
        for &v in &level.cycle {
            if v != entry_dep {
                next_selected.push(level.arcs[level.best_in[v]]);
            }
        }
        let broken = level.arcs[level.best_in[entry_dep]];
        expansions.push(Expansion {
            cycle: level.cycle,
            broken: (broken.head, broken.dep),
        });
        selected = next_selected;
    }

    let mut heads = vec![0; graph.len()];
    for arc in selected {
        heads[arc.dep] = arc.head;
    }
    Ok((DependencyTree::from_heads_unchecked(heads), expansions))
}

/// Picks the best incoming arc of every non-root node. The first arc wins a tie.
fn best_incoming(n_nodes: usize, arcs: &[Arc], representatives: &[usize]) -> Result<Vec<usize>> {
    let mut best: Vec<Option<usize>> = vec![None; n_nodes];
    for (i, arc) in arcs.iter().enumerate() {
        if best[arc.dep].is_none_or(|j| arc.weight > arcs[j].weight) {
            best[arc.dep] = Some(i);
        }
    }
    let mut best_in = Vec::with_capacity(n_nodes);
    best_in.push(usize::MAX);
    for (v, b) in best.into_iter().enumerate().skip(1) {
        match b {
            Some(i) => best_in.push(i),
            None => return Err(RudepError::no_arborescence(representatives[v])),
        }
    }
    Ok(best_in)
}

/// Returns the first cycle among the chosen arcs, searching from ascending nodes. The nodes are
/// returned in ascending order.
fn find_cycle(n_nodes: usize, arcs: &[Arc], best_in: &[usize]) -> Option<Vec<usize>> {
    // 0: unvisited; otherwise the start node of the walk that visited the node, plus one
    let mut visited_by = vec![0; n_nodes];
    visited_by[0] = usize::MAX;
    for start in 1..n_nodes {
        let mut v = start;
        while visited_by[v] == 0 {
            visited_by[v] = start + 1;
            v = arcs[best_in[v]].head;
        }
        if visited_by[v] == start + 1 {
            let mut cycle = vec![v];
            let mut u = arcs[best_in[v]].head;
            while u != v {
                cycle.push(u);
                u = arcs[best_in[u]].head;
            }
            cycle.sort_unstable();
            return Some(cycle);
        }
    }
    None
}
