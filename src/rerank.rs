//! Centrality reranking
//!
//! Folds normalized degree centrality back into topic scores, then
//! re-derives tiers from the new distribution. Topics and graph nodes are
//! both returned as new values; the inputs are left untouched.

use crate::config::{CentralityConfig, TierConfig};
use crate::graph::{ConceptGraph, GraphNode};
use crate::topics::{assign_tiers, sort_ranked, TopicSet};
use tracing::debug;

pub struct CentralityReranker<'a> {
    centrality: &'a CentralityConfig,
    tiers: &'a TierConfig,
}

impl<'a> CentralityReranker<'a> {
    pub fn new(centrality: &'a CentralityConfig, tiers: &'a TierConfig) -> Self {
        Self { centrality, tiers }
    }

    /// `score + (in + out) / max_degree · boost`, then tiers again.
    pub fn rerank(&self, topics: &TopicSet, graph: &ConceptGraph) -> (TopicSet, ConceptGraph) {
        let degrees = graph.degrees();
        let max_degree = degrees.values().copied().max().unwrap_or(0);

        let mut reranked = topics.topics.clone();
        for topic in &mut reranked {
            let degree = degrees.get(&topic.key).copied().unwrap_or(0);
            let centrality = if max_degree == 0 {
                0.0
            } else {
                degree as f64 / max_degree as f64
            };
            topic.score += centrality * self.centrality.boost;
        }
        sort_ranked(&mut reranked);
        let thresholds = assign_tiers(&mut reranked, self.tiers);
        debug!(topics = reranked.len(), max_degree, "reranked topics by centrality");

        let nodes = graph
            .nodes
            .iter()
            .map(|node| {
                reranked
                    .iter()
                    .find(|t| t.key == node.key)
                    .map(GraphNode::from)
                    .unwrap_or_else(|| node.clone())
            })
            .collect();

        (
            TopicSet {
                topics: reranked,
                thresholds,
            },
            ConceptGraph::new(nodes, graph.edges.clone()),
        )
    }
}
