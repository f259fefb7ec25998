//! The concept graph: topic nodes plus reduced, directed edges

use super::edge::Edge;
use crate::topics::{Tier, TopicCandidate, TopicKey};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A topic as it appears in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub key: TopicKey,
    pub display_name: String,
    pub tier: Tier,
    pub score: f64,
}

impl From<&TopicCandidate> for GraphNode {
    fn from(topic: &TopicCandidate) -> Self {
        Self {
            key: topic.key.clone(),
            display_name: topic.display_name.clone(),
            tier: topic.tier,
            score: topic.score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl ConceptGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, key: &TopicKey) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn edge(&self, source: &TopicKey, target: &TopicKey) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(source, target))
    }

    pub fn outgoing<'a>(&'a self, key: &'a TopicKey) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.source == key)
    }

    pub fn incoming<'a>(&'a self, key: &'a TopicKey) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.target == key)
    }

    /// In-degree plus out-degree per node key
    pub fn degrees(&self) -> HashMap<&TopicKey, usize> {
        let mut degrees: HashMap<&TopicKey, usize> =
            self.nodes.iter().map(|n| (&n.key, 0)).collect();
        for edge in &self.edges {
            *degrees.entry(&edge.source).or_insert(0) += 1;
            *degrees.entry(&edge.target).or_insert(0) += 1;
        }
        degrees
    }

    /// Whether `target` is reachable from `source` along directed edges
    pub fn reaches(&self, source: &TopicKey, target: &TopicKey) -> bool {
        let index = EdgeIndex::build(&self.edges);
        index.reaches(source, target, None)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Outgoing adjacency over an edge list, by edge position.
pub(crate) struct EdgeIndex<'a> {
    outgoing: HashMap<&'a TopicKey, Vec<usize>>,
    edges: &'a [Edge],
}

impl<'a> EdgeIndex<'a> {
    pub(crate) fn build(edges: &'a [Edge]) -> Self {
        let mut outgoing: HashMap<&TopicKey, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            outgoing.entry(&edge.source).or_default().push(i);
        }
        Self { outgoing, edges }
    }

    pub(crate) fn successors(&self, key: &TopicKey) -> impl Iterator<Item = (usize, &'a Edge)> + '_ {
        let edges = self.edges;
        self.outgoing
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&i| (i, &edges[i]))
    }

    /// BFS reachability, optionally ignoring one edge by position.
    pub(crate) fn reaches(&self, from: &TopicKey, to: &TopicKey, skip: Option<usize>) -> bool {
        if from == to {
            return true;
        }
        let mut visited: HashSet<&TopicKey> = HashSet::new();
        let mut queue: VecDeque<&TopicKey> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for (i, edge) in self.successors(current) {
                if Some(i) == skip {
                    continue;
                }
                if &edge.target == to {
                    return true;
                }
                if visited.insert(&edge.target) {
                    queue.push_back(&edge.target);
                }
            }
        }
        false
    }
}
