//! One analysis run: documents in, an immutable [`AnalysisBundle`] out.
//!
//! Stages run in order and each returns a new value:
//! signal extraction → candidate extraction → topic scoring → graph
//! building → centrality reranking. The evidence corpus for retrieval is
//! built from the same corpus and travels with the bundle.
//!
//! Collaborators (topic suggester, relationship judge) are consulted before
//! the core stages run, never inside one. A failing collaborator is logged
//! and the run continues without its input.

use crate::collaborator::{
    truncate_chars, CollaboratorError, Judgment, RelationshipJudge, RelationshipJudgment,
    TopicSuggester, TopicSuggestion, MAX_SUGGESTER_INPUT_CHARS,
};
use crate::config::ConceptMapConfig;
use crate::corpus::{Corpus, DocumentSet, EvidenceCorpus, SignalExtractor};
use crate::embedding::{Embedder, HashingEmbedder};
use crate::error::ConceptMapResult;
use crate::graph::{BuildReport, ConceptGraph, GraphBuilder};
use crate::rerank::CentralityReranker;
use crate::retrieval::EvidenceRetriever;
use crate::topics::{CandidateExtractor, TopicCandidate, TopicScorer, TopicSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upper bound on relationship-judge calls per run.
pub const MAX_JUDGED_PAIRS: usize = 64;

/// Shared context sent to the judge is truncated to this many characters.
const MAX_JUDGE_CONTEXT_CHARS: usize = 2000;

/// Everything one run consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub documents: DocumentSet,
    #[serde(default)]
    pub suggestions: Vec<TopicSuggestion>,
    #[serde(default)]
    pub relationships: Vec<RelationshipJudgment>,
}

impl AnalysisInput {
    pub fn new(documents: DocumentSet) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<TopicSuggestion>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<RelationshipJudgment>) -> Self {
        self.relationships = relationships;
        self
    }
}

/// Result of one analysis run.
///
/// Serializes to the ranked topics, the reduced graph and the build report.
/// The corpus and evidence chunks stay in memory for retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub topics: TopicSet,
    pub graph: ConceptGraph,
    pub report: BuildReport,
    #[serde(skip)]
    corpus: Corpus,
    #[serde(skip)]
    evidence: EvidenceCorpus,
}

impl AnalysisBundle {
    fn empty(corpus: Corpus) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            topics: TopicSet::default(),
            graph: ConceptGraph::default(),
            report: BuildReport::default(),
            corpus,
            evidence: EvidenceCorpus::default(),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn evidence(&self) -> &EvidenceCorpus {
        &self.evidence
    }

    /// Look up a ranked topic by any surface form of its name.
    pub fn topic(&self, name: &str) -> Option<&TopicCandidate> {
        self.topics.find(name)
    }
}

pub struct AnalysisPipeline {
    config: ConceptMapConfig,
    embedder: Arc<dyn Embedder>,
}

impl AnalysisPipeline {
    /// Validates the configuration up front.
    pub fn new(config: ConceptMapConfig, embedder: Arc<dyn Embedder>) -> ConceptMapResult<Self> {
        config.validate()?;
        Ok(Self { config, embedder })
    }

    /// Default configuration and the hashing embedder.
    pub fn with_defaults() -> Self {
        Self {
            config: ConceptMapConfig::default(),
            embedder: Arc::new(HashingEmbedder::default()),
        }
    }

    pub fn config(&self) -> &ConceptMapConfig {
        &self.config
    }

    /// Run every stage over the input's documents.
    pub fn analyze(&self, input: &AnalysisInput) -> ConceptMapResult<AnalysisBundle> {
        let corpus = SignalExtractor::new().extract(&input.documents)?;
        self.analyze_corpus(corpus, &input.suggestions, &input.relationships)
    }

    /// Run scoring, graph building and reranking over an extracted corpus.
    pub fn analyze_corpus(
        &self,
        corpus: Corpus,
        suggestions: &[TopicSuggestion],
        relationships: &[RelationshipJudgment],
    ) -> ConceptMapResult<AnalysisBundle> {
        if corpus.is_empty() {
            info!("empty corpus, nothing to analyze");
            return Ok(AnalysisBundle::empty(corpus));
        }

        let topics = self.score(&corpus, suggestions);
        let build = GraphBuilder::new(&self.config.graph, self.embedder.as_ref()).build(
            &topics,
            &corpus,
            relationships,
        )?;
        let (topics, graph) = CentralityReranker::new(&self.config.centrality, &self.config.tiers)
            .rerank(&topics, &build.graph);
        let evidence =
            EvidenceCorpus::build(&corpus, self.embedder.as_ref(), self.config.retrieval.chunk_chars)?;

        let bundle = AnalysisBundle {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            topics,
            graph,
            report: build.report,
            corpus,
            evidence,
        };
        info!(
            bundle = %bundle.id,
            topics = bundle.topics.len(),
            edges = bundle.graph.edge_count(),
            chunks = bundle.evidence.len(),
            "analysis complete"
        );
        Ok(bundle)
    }

    /// Like [`analyze`](Self::analyze), first asking the suggester for topic
    /// candidates and the judge for the direction of co-occurring pairs.
    pub async fn analyze_with_collaborators(
        &self,
        input: &AnalysisInput,
        suggester: &dyn TopicSuggester,
        judge: &dyn RelationshipJudge,
    ) -> ConceptMapResult<AnalysisBundle> {
        let corpus = SignalExtractor::new().extract(&input.documents)?;
        if corpus.is_empty() {
            info!("empty corpus, collaborators not consulted");
            return Ok(AnalysisBundle::empty(corpus));
        }

        let mut suggestions = input.suggestions.clone();
        let full_text = corpus.full_text();
        match suggester
            .suggest(truncate_chars(&full_text, MAX_SUGGESTER_INPUT_CHARS))
            .await
        {
            Ok(found) => {
                debug!(suggestions = found.len(), "topic suggester replied");
                suggestions.extend(found);
            }
            Err(e) => warn!(error = %e, "topic suggester failed, continuing without suggestions"),
        }

        let preliminary = self.score(&corpus, &suggestions);
        let mut relationships = input.relationships.clone();
        relationships.extend(self.judge_pairs(&preliminary, &corpus, judge).await);

        self.analyze_corpus(corpus, &suggestions, &relationships)
    }

    /// Retrieval over a bundle, reporting graph edges on pairwise queries.
    pub fn retriever<'a>(&'a self, bundle: &'a AnalysisBundle) -> EvidenceRetriever<'a> {
        EvidenceRetriever::new(&bundle.evidence, &self.config.retrieval, self.embedder.as_ref())
            .with_graph(&bundle.graph)
    }

    fn score(&self, corpus: &Corpus, suggestions: &[TopicSuggestion]) -> TopicSet {
        let mut candidates = CandidateExtractor::new(&self.config.extraction).extract(corpus);
        for suggestion in suggestions {
            candidates.add(&suggestion.name, Some(suggestion.tier));
        }
        TopicScorer::new(&self.config).score(&candidates, corpus)
    }

    /// Ask the judge about topic pairs sharing a segment, in corpus order.
    /// Stops asking once the judge reports itself unavailable.
    async fn judge_pairs(
        &self,
        topics: &TopicSet,
        corpus: &Corpus,
        judge: &dyn RelationshipJudge,
    ) -> Vec<RelationshipJudgment> {
        let mut judged = Vec::new();
        for (a, b, context) in co_occurring_pairs(topics, corpus) {
            let (first, second) = (&topics.topics[a].display_name, &topics.topics[b].display_name);
            match judge.judge(first, second, &context).await {
                Ok(Judgment::ParentChild) => {
                    judged.push(RelationshipJudgment::new(first.as_str(), second.as_str()))
                }
                Ok(Judgment::ChildParent) => {
                    judged.push(RelationshipJudgment::new(second.as_str(), first.as_str()))
                }
                Ok(Judgment::Unrelated) => {}
                Err(CollaboratorError::Unavailable(reason)) => {
                    warn!(%reason, "relationship judge unavailable, skipping judgments");
                    break;
                }
                Err(e) => warn!(error = %e, a = %first, b = %second, "relationship judgment failed"),
            }
        }
        debug!(judgments = judged.len(), "relationship judge finished");
        judged
    }
}

/// Topic index pairs `(a, b)` with `a` ranked above `b` that share a
/// segment, each with that segment's text. At most [`MAX_JUDGED_PAIRS`].
fn co_occurring_pairs(topics: &TopicSet, corpus: &Corpus) -> Vec<(usize, usize, String)> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for segment in corpus.segments() {
        let units: BTreeSet<usize> = segment.unit_indices().collect();
        let present: Vec<usize> = topics
            .topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.mentions.iter().any(|m| units.contains(&m.unit)))
            .map(|(i, _)| i)
            .collect();
        if present.len() < 2 {
            continue;
        }

        let context: String = segment
            .unit_indices()
            .filter_map(|i| corpus.unit(i))
            .map(|u| u.raw_text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let context = truncate_chars(&context, MAX_JUDGE_CONTEXT_CHARS);

        for (n, &a) in present.iter().enumerate() {
            for &b in &present[n + 1..] {
                if seen.insert((a, b)) {
                    pairs.push((a, b, context.to_string()));
                    if pairs.len() == MAX_JUDGED_PAIRS {
                        return pairs;
                    }
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{StaticJudge, StaticSuggester};
    use crate::corpus::{DocumentInput, SlideRecord};
    use crate::topics::{Tier, TopicKey};

    fn deck() -> DocumentSet {
        DocumentSet::new(vec![DocumentInput::slides(
            "algorithms",
            vec![
                SlideRecord::new("Learning Objectives", "Understand recursion and sorting."),
                SlideRecord::new("Recursion", "A function calls itself. Recursion needs a base case."),
                SlideRecord::new("Base Case", "The base case stops recursion."),
                SlideRecord::new("Merge Sort", "Merge sort uses recursion to sort halves."),
                SlideRecord::new("Summary", "Recursion and merge sort."),
            ],
        )])
    }

    #[test]
    fn analyze_produces_ranked_topics_and_graph() {
        let pipeline = AnalysisPipeline::with_defaults();
        let bundle = pipeline.analyze(&AnalysisInput::new(deck())).unwrap();

        assert!(!bundle.topics.is_empty());
        let recursion = bundle.topic("recursion").unwrap();
        assert_eq!(recursion.tier, Tier::ExamCritical);
        assert_eq!(bundle.topics.topics[0].key, TopicKey::new("recursion"));
        assert_eq!(bundle.graph.node_count(), bundle.topics.len());
        assert!(bundle.graph.edges.iter().all(|e| e.weight >= 2.0));
        assert!(!bundle.evidence().is_empty());
    }

    #[test]
    fn empty_documents_give_empty_bundle() {
        let pipeline = AnalysisPipeline::with_defaults();
        let bundle = pipeline.analyze(&AnalysisInput::default()).unwrap();
        assert!(bundle.topics.is_empty());
        assert_eq!(bundle.graph.edge_count(), 0);
        assert!(bundle.evidence().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ConceptMapConfig::default();
        config.retrieval.default_k = 0;
        let result = AnalysisPipeline::new(config, Arc::new(HashingEmbedder::default()));
        assert!(result.is_err());
    }

    #[test]
    fn bundle_serializes_without_corpus() {
        let pipeline = AnalysisPipeline::with_defaults();
        let bundle = pipeline.analyze(&AnalysisInput::new(deck())).unwrap();
        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value["topics"]["topics"].is_array());
        assert!(value["graph"]["edges"].is_array());
        assert!(value.get("corpus").is_none());
        assert!(value.get("evidence").is_none());
    }

    #[test]
    fn co_occurring_pairs_are_unique() {
        let pipeline = AnalysisPipeline::with_defaults();
        let bundle = pipeline.analyze(&AnalysisInput::new(deck())).unwrap();
        let pairs = co_occurring_pairs(&bundle.topics, bundle.corpus());
        let distinct: HashSet<(usize, usize)> = pairs.iter().map(|(a, b, _)| (*a, *b)).collect();
        assert_eq!(distinct.len(), pairs.len());
        assert!(pairs.iter().all(|(a, b, _)| a != b));
    }

    #[tokio::test]
    async fn collaborators_feed_suggestions_and_judgments() {
        let pipeline = AnalysisPipeline::with_defaults();
        let suggester = StaticSuggester::available(vec![TopicSuggestion::new(
            "Base Case",
            Tier::ExamCritical,
        )]);
        let judge = StaticJudge::available().with_parent("Recursion", "Base Case");

        let bundle = pipeline
            .analyze_with_collaborators(&AnalysisInput::new(deck()), &suggester, &judge)
            .await
            .unwrap();

        let base = bundle.topic("base case").unwrap();
        assert_eq!(base.suggested_tier, Some(Tier::ExamCritical));
        let edge = bundle
            .graph
            .edge(&TopicKey::new("recursion"), &TopicKey::new("base case"));
        let reached = bundle
            .graph
            .reaches(&TopicKey::new("recursion"), &TopicKey::new("base case"));
        assert!(edge.is_some() || reached);
    }

    #[tokio::test]
    async fn unavailable_collaborators_do_not_fail_the_run() {
        let pipeline = AnalysisPipeline::with_defaults();
        let input = AnalysisInput::new(deck());
        let bundle = pipeline
            .analyze_with_collaborators(
                &input,
                &StaticSuggester::unavailable(),
                &StaticJudge::unavailable(),
            )
            .await
            .unwrap();
        let plain = pipeline.analyze(&input).unwrap();
        assert_eq!(bundle.topics.len(), plain.topics.len());
        assert_eq!(bundle.graph.edges, plain.graph.edges);
    }
}
