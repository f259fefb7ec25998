//! Cycle breaking and transitive reduction
//!
//! Both operate on an edge list in insertion order. Cycle breaking runs
//! first so that reduction always sees a DAG, where the transitive
//! reduction is unique.

use super::concept_graph::EdgeIndex;
use super::edge::Edge;
use crate::topics::TopicKey;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Find one directed cycle, as edge positions in path order.
///
/// Depth-first from each node in `nodes` order, successors in edge order,
/// so the same input always yields the same cycle.
pub fn find_cycle(nodes: &[TopicKey], edges: &[Edge]) -> Option<Vec<usize>> {
    let index = EdgeIndex::build(edges);
    let mut state: HashMap<&TopicKey, Visit> = HashMap::new();

    for start in nodes {
        if state.contains_key(start) {
            continue;
        }
        state.insert(start, Visit::InProgress);
        let mut stack: Vec<(&TopicKey, Vec<(usize, &Edge)>, usize)> =
            vec![(start, index.successors(start).collect(), 0)];
        // path[i] is the edge leading from stack[i] to stack[i + 1]
        let mut path: Vec<usize> = Vec::new();

        loop {
            let Some(top) = stack.last_mut() else {
                break;
            };
            let node = top.0;
            let next = if top.2 < top.1.len() {
                top.2 += 1;
                Some(top.1[top.2 - 1])
            } else {
                None
            };

            match next {
                Some((edge_pos, edge)) => match state.get(&edge.target).copied() {
                    Some(Visit::InProgress) => {
                        let depth = stack.iter().position(|(n, _, _)| *n == &edge.target)?;
                        let mut cycle = path[depth..].to_vec();
                        cycle.push(edge_pos);
                        return Some(cycle);
                    }
                    Some(Visit::Done) => {}
                    None => {
                        state.insert(&edge.target, Visit::InProgress);
                        path.push(edge_pos);
                        stack.push((&edge.target, index.successors(&edge.target).collect(), 0));
                    }
                },
                None => {
                    state.insert(node, Visit::Done);
                    stack.pop();
                    path.pop();
                }
            }
        }
    }
    None
}

/// Remove edges until no directed cycle remains.
///
/// On each cycle the lowest-weight edge goes; among equal weights, the one
/// inserted last. Returns the removed edges in removal order.
pub fn break_cycles(nodes: &[TopicKey], edges: &mut Vec<Edge>) -> Vec<Edge> {
    let mut removed = Vec::new();
    while let Some(cycle) = find_cycle(nodes, edges) {
        let Some(victim) = cycle.iter().copied().min_by(|&a, &b| {
            edges[a]
                .weight
                .partial_cmp(&edges[b].weight)
                .unwrap_or(Ordering::Equal)
                .then(b.cmp(&a))
        }) else {
            break;
        };
        let edge = edges.remove(victim);
        warn!(
            source = %edge.source,
            target = %edge.target,
            weight = edge.weight,
            cycle_len = cycle.len(),
            "broke cycle in concept graph"
        );
        removed.push(edge);
    }
    removed
}

/// Drop every edge whose target is also reachable from its source through
/// another path of length ≥ 2. Expects an acyclic edge list.
///
/// Returns `(kept, removed)`, both in input order.
pub fn transitive_reduction(edges: Vec<Edge>) -> (Vec<Edge>, Vec<Edge>) {
    let redundant: Vec<bool> = {
        let index = EdgeIndex::build(&edges);
        edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                index.successors(&edge.source).any(|(j, via)| {
                    j != i && via.target != edge.target && index.reaches(&via.target, &edge.target, None)
                })
            })
            .collect()
    };

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for (edge, is_redundant) in edges.into_iter().zip(redundant) {
        if is_redundant {
            removed.push(edge);
        } else {
            kept.push(edge);
        }
    }
    (kept, removed)
}
