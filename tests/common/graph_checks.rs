//! Structural checks on concept graphs

use conceptmap::{ConceptGraph, TopicKey};
use std::collections::{HashMap, HashSet, VecDeque};

/// Whether `to` is reachable from `from` without using edge `skip`.
pub fn reachable_without(graph: &ConceptGraph, from: &TopicKey, to: &TopicKey, skip: usize) -> bool {
    let mut outgoing: HashMap<&TopicKey, Vec<&TopicKey>> = HashMap::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        if i != skip {
            outgoing.entry(&edge.source).or_default().push(&edge.target);
        }
    }

    let mut visited: HashSet<&TopicKey> = HashSet::new();
    let mut queue: VecDeque<&TopicKey> = VecDeque::new();
    queue.push_back(from);
    visited.insert(from);

    while let Some(current) = queue.pop_front() {
        for next in outgoing.get(current).into_iter().flatten() {
            if *next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Whether any edge closes a directed cycle.
pub fn has_cycle(graph: &ConceptGraph) -> bool {
    graph
        .edges
        .iter()
        .enumerate()
        .any(|(i, e)| reachable_without(graph, &e.target, &e.source, i))
}
