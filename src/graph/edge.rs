//! Weighted, directed concept edges

use crate::topics::TopicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signals that contribute weight to an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Both topics appear in the same slide/page
    CoOccurrence,
    /// Source in a slide title, target in that slide's body
    Containment,
    /// Topics in consecutive slides/pages of one document
    Adjacency,
    /// Topic-name embeddings are close
    SemanticSimilarity,
    /// A relationship judge asserted parent → child
    ExternalJudgment,
}

impl SignalKind {
    /// Whether the signal carries its own direction
    pub fn is_directed(self) -> bool {
        matches!(self, SignalKind::Containment | SignalKind::ExternalJudgment)
    }
}

/// A directed edge between two topics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: TopicKey,
    pub target: TopicKey,
    /// Sum of all signal contributions
    pub weight: f64,
    /// Weight contributed by each signal
    pub contributing_signals: BTreeMap<SignalKind, f64>,
}

impl Edge {
    pub fn new(source: TopicKey, target: TopicKey) -> Self {
        Self {
            source,
            target,
            weight: 0.0,
            contributing_signals: BTreeMap::new(),
        }
    }

    /// Add weight from one signal; repeated signals accumulate
    pub fn with_signal(mut self, kind: SignalKind, weight: f64) -> Self {
        self.add_signal(kind, weight);
        self
    }

    pub fn add_signal(&mut self, kind: SignalKind, weight: f64) {
        *self.contributing_signals.entry(kind).or_insert(0.0) += weight;
        self.weight += weight;
    }

    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.contributing_signals.contains_key(&kind)
    }

    pub fn connects(&self, source: &TopicKey, target: &TopicKey) -> bool {
        &self.source == source && &self.target == target
    }
}
