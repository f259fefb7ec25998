//! Multi-signal graph construction
//!
//! Signals are accumulated per unordered topic pair, then each pair gets
//! exactly one direction:
//! 1. an external judgment, if any
//! 2. otherwise the net containment direction
//! 3. otherwise the more important tier first
//! 4. otherwise the earlier first mention first
//!
//! Pairs below the weight floor are dropped, cycles are broken, and the
//! result is transitively reduced.

use super::concept_graph::{ConceptGraph, GraphNode};
use super::edge::{Edge, SignalKind};
use super::reduction::{break_cycles, transitive_reduction};
use crate::collaborator::RelationshipJudgment;
use crate::config::GraphConfig;
use crate::corpus::Corpus;
use crate::embedding::{cosine_similarity, Embedder, EmbeddingError};
use crate::error::ConceptMapResult;
use crate::topics::{TopicKey, TopicSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// What happened while building, beyond the graph itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Topic pairs with at least one signal
    pub candidate_pairs: usize,
    /// Pairs dropped for total weight below the floor
    pub below_threshold: usize,
    /// Edges removed to break directed cycles, in removal order
    pub broken_cycle_edges: Vec<Edge>,
    /// Edges removed by transitive reduction
    pub reduced_edges: Vec<Edge>,
    /// External judgments naming unknown topics or a topic and itself
    pub skipped_judgments: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphBuild {
    pub graph: ConceptGraph,
    pub report: BuildReport,
}

/// Signals for one unordered pair `(lo, hi)`, `lo < hi` by topic index.
struct PairSignals {
    order: usize,
    signals: BTreeMap<SignalKind, f64>,
    /// Net containment weight; positive means `lo → hi`
    containment: f64,
    /// External direction; `true` means `lo → hi`
    judged: Option<bool>,
}

#[derive(Default)]
struct PairTable {
    pairs: HashMap<(usize, usize), PairSignals>,
}

impl PairTable {
    fn entry(&mut self, a: usize, b: usize) -> &mut PairSignals {
        let next = self.pairs.len();
        self.pairs
            .entry((a.min(b), a.max(b)))
            .or_insert_with(|| PairSignals {
                order: next,
                signals: BTreeMap::new(),
                containment: 0.0,
                judged: None,
            })
    }

    fn add(&mut self, a: usize, b: usize, kind: SignalKind, weight: f64) {
        *self.entry(a, b).signals.entry(kind).or_insert(0.0) += weight;
    }

    /// Directed contribution `from → to`
    fn add_containment(&mut self, from: usize, to: usize, weight: f64) {
        let pair = self.entry(from, to);
        *pair.signals.entry(SignalKind::Containment).or_insert(0.0) += weight;
        pair.containment += if from < to { weight } else { -weight };
    }
}

pub struct GraphBuilder<'a> {
    config: &'a GraphConfig,
    embedder: &'a dyn Embedder,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a GraphConfig, embedder: &'a dyn Embedder) -> Self {
        Self { config, embedder }
    }

    pub fn build(
        &self,
        topics: &TopicSet,
        corpus: &Corpus,
        judgments: &[RelationshipJudgment],
    ) -> ConceptMapResult<GraphBuild> {
        let nodes: Vec<GraphNode> = topics.topics.iter().map(GraphNode::from).collect();
        if nodes.is_empty() {
            info!("no topics, concept graph is empty");
            return Ok(GraphBuild::default());
        }

        let mut table = PairTable::default();
        self.structural_signals(topics, corpus, &mut table);
        self.semantic_signals(topics, &mut table)?;
        let skipped_judgments = self.judgment_signals(topics, judgments, &mut table);

        let mut report = BuildReport {
            candidate_pairs: table.pairs.len(),
            skipped_judgments,
            ..Default::default()
        };

        let mut ordered: Vec<((usize, usize), PairSignals)> = table.pairs.into_iter().collect();
        ordered.sort_by_key(|(_, p)| p.order);

        let mut edges = Vec::new();
        for ((lo, hi), pair) in ordered {
            let weight: f64 = pair.signals.values().sum();
            if weight < self.config.min_edge_weight {
                report.below_threshold += 1;
                continue;
            }
            let (source, target) = if self.lo_is_source(topics, lo, hi, &pair) {
                (lo, hi)
            } else {
                (hi, lo)
            };
            let mut edge = Edge::new(
                topics.topics[source].key.clone(),
                topics.topics[target].key.clone(),
            );
            for (kind, w) in pair.signals {
                edge.add_signal(kind, w);
            }
            edges.push(edge);
        }

        let keys: Vec<TopicKey> = nodes.iter().map(|n| n.key.clone()).collect();
        report.broken_cycle_edges = break_cycles(&keys, &mut edges);
        let (kept, reduced) = transitive_reduction(edges);
        report.reduced_edges = reduced;

        info!(
            nodes = nodes.len(),
            edges = kept.len(),
            below_threshold = report.below_threshold,
            cycles_broken = report.broken_cycle_edges.len(),
            reduced = report.reduced_edges.len(),
            "built concept graph"
        );

        Ok(GraphBuild {
            graph: ConceptGraph::new(nodes, kept),
            report,
        })
    }

    /// Co-occurrence, containment and adjacency from segment structure.
    fn structural_signals(&self, topics: &TopicSet, corpus: &Corpus, table: &mut PairTable) {
        let mut unit_topics: Vec<Vec<usize>> = vec![Vec::new(); corpus.len()];
        for (i, topic) in topics.topics.iter().enumerate() {
            for mention in &topic.mentions {
                if let Some(slot) = unit_topics.get_mut(mention.unit) {
                    slot.push(i);
                }
            }
        }

        let mut present: Vec<BTreeSet<usize>> = Vec::with_capacity(corpus.segments().len());
        for segment in corpus.segments() {
            let in_title: BTreeSet<usize> = segment
                .title_units
                .iter()
                .flat_map(|&u| unit_topics[u].iter().copied())
                .collect();
            let in_body: BTreeSet<usize> = segment
                .body_units
                .iter()
                .flat_map(|&u| unit_topics[u].iter().copied())
                .collect();
            let all: BTreeSet<usize> = in_title.union(&in_body).copied().collect();

            for (n, &a) in all.iter().enumerate() {
                for &b in all.iter().skip(n + 1) {
                    table.add(a, b, SignalKind::CoOccurrence, self.config.co_occurrence);
                }
            }
            for &a in &in_title {
                for &b in in_body.difference(&in_title) {
                    table.add_containment(a, b, self.config.containment);
                }
            }
            present.push(all);
        }

        for (s1, s2) in corpus.adjacent_segments() {
            let mut seen = BTreeSet::new();
            for &a in &present[s1] {
                for &b in &present[s2] {
                    if a != b && seen.insert((a.min(b), a.max(b))) {
                        table.add(a, b, SignalKind::Adjacency, self.config.adjacency);
                    }
                }
            }
        }
    }

    /// Cosine similarity of topic-name embeddings, rescaled above the floor.
    fn semantic_signals(&self, topics: &TopicSet, table: &mut PairTable) -> ConceptMapResult<()> {
        let names: Vec<&str> = topics.topics.iter().map(|t| t.display_name.as_str()).collect();
        let vectors = self.embedder.embed_batch(&names)?;
        if vectors.len() != names.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: names.len(),
                got: vectors.len(),
            }
            .into());
        }

        let c = self.config;
        for i in 0..vectors.len() {
            for j in (i + 1)..vectors.len() {
                let sim = f64::from(cosine_similarity(&vectors[i], &vectors[j])).min(1.0);
                if sim > c.similarity_floor {
                    let t = (sim - c.similarity_floor) / (1.0 - c.similarity_floor);
                    let weight =
                        c.similarity_min_weight + t * (c.similarity_max_weight - c.similarity_min_weight);
                    table.add(i, j, SignalKind::SemanticSimilarity, weight);
                }
            }
        }
        Ok(())
    }

    /// External parent → child judgments. Returns the number skipped.
    fn judgment_signals(
        &self,
        topics: &TopicSet,
        judgments: &[RelationshipJudgment],
        table: &mut PairTable,
    ) -> usize {
        let index: HashMap<&TopicKey, usize> = topics
            .topics
            .iter()
            .enumerate()
            .map(|(i, t)| (&t.key, i))
            .collect();

        let mut skipped = 0;
        for judgment in judgments {
            let parent = TopicKey::new(&judgment.parent);
            let child = TopicKey::new(&judgment.child);
            let (Some(&p), Some(&c)) = (index.get(&parent), index.get(&child)) else {
                debug!(parent = %parent, child = %child, "judgment names unknown topic, skipped");
                skipped += 1;
                continue;
            };
            if p == c {
                debug!(topic = %parent, "judgment relates a topic to itself, skipped");
                skipped += 1;
                continue;
            }

            let pair = table.entry(p, c);
            if pair.judged.is_some() {
                debug!(parent = %parent, child = %child, "pair already judged, keeping first judgment");
                continue;
            }
            pair.judged = Some(p < c);
            *pair.signals.entry(SignalKind::ExternalJudgment).or_insert(0.0) +=
                self.config.external_judgment;
        }
        skipped
    }

    fn lo_is_source(&self, topics: &TopicSet, lo: usize, hi: usize, pair: &PairSignals) -> bool {
        if let Some(forward) = pair.judged {
            return forward;
        }
        if pair.containment != 0.0 {
            return pair.containment > 0.0;
        }
        let (a, b) = (&topics.topics[lo], &topics.topics[hi]);
        if a.tier != b.tier {
            return a.tier > b.tier;
        }
        a.first_mention().unwrap_or(usize::MAX) <= b.first_mention().unwrap_or(usize::MAX)
    }
}
