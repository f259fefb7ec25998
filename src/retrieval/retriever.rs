use super::synonyms::SynonymTable;
use crate::config::RetrievalConfig;
use crate::corpus::{text, EvidenceChunk, EvidenceCorpus, Location};
use crate::embedding::{centroid, cosine_similarity, CachedEmbedder, Embedder};
use crate::error::{ConceptMapError, ConceptMapResult};
use crate::graph::{ConceptGraph, Edge};
use crate::topics::TopicKey;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Per-signal contributions to a snippet's combined score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub direct: f64,
    pub semantic: f64,
    pub structural: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.direct + self.semantic + self.structural
    }
}

/// A chunk returned for a query, with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSnippet {
    pub chunk: EvidenceChunk,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Outcome of a pairwise query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectionEvidence {
    /// Chunks from slides or pages that mention both topics; never empty.
    /// `relation` is the graph edge between them, in either direction, when
    /// the graph has one.
    Shared {
        snippets: Vec<ScoredSnippet>,
        relation: Option<Edge>,
    },
    NoSharedEvidence,
}

impl ConnectionEvidence {
    pub fn is_shared(&self) -> bool {
        matches!(self, ConnectionEvidence::Shared { .. })
    }

    pub fn snippets(&self) -> &[ScoredSnippet] {
        match self {
            ConnectionEvidence::Shared { snippets, .. } => snippets,
            ConnectionEvidence::NoSharedEvidence => &[],
        }
    }
}

/// A topic name prepared for matching against chunks.
struct TopicQuery<'t> {
    phrase: String,
    words: BTreeSet<String>,
    synonyms: Vec<&'t str>,
}

impl TopicQuery<'_> {
    /// Whether the chunk names the topic or one of its synonyms.
    fn mentioned_in(&self, chunk: &EvidenceChunk) -> bool {
        let haystack = chunk.normalized_text();
        text::contains_phrase(haystack, &self.phrase)
            || self.synonyms.iter().any(|s| text::contains_phrase(haystack, s))
    }
}

/// Read-only ranked search over an evidence corpus.
///
/// Query embeddings are memoized, so repeated queries for the same topic
/// embed it once. Safe to share across threads.
pub struct EvidenceRetriever<'a> {
    evidence: &'a EvidenceCorpus,
    config: &'a RetrievalConfig,
    queries: CachedEmbedder<&'a dyn Embedder>,
    synonyms: SynonymTable,
    graph: Option<&'a ConceptGraph>,
}

impl<'a> EvidenceRetriever<'a> {
    pub fn new(
        evidence: &'a EvidenceCorpus,
        config: &'a RetrievalConfig,
        embedder: &'a dyn Embedder,
    ) -> Self {
        Self {
            evidence,
            config,
            queries: CachedEmbedder::new(embedder),
            synonyms: SynonymTable::with_extra(&config.synonyms),
            graph: None,
        }
    }

    /// Attach a graph so pairwise results report the edge between topics.
    pub fn with_graph(mut self, graph: &'a ConceptGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn default_k(&self) -> usize {
        self.config.default_k
    }

    /// Distinct query texts embedded so far
    pub fn cached_queries(&self) -> usize {
        self.queries.cached()
    }

    /// Top `k` snippets for a topic, descending by combined score; ties go
    /// to the earlier chunk.
    pub fn retrieve(&self, topic: &str, k: usize) -> ConceptMapResult<Vec<ScoredSnippet>> {
        let query = self.prepare(topic);
        if k == 0 || self.evidence.is_empty() || query.phrase.is_empty() {
            return Ok(Vec::new());
        }
        let embedding = self.queries.embed(&query.phrase)?;

        let candidates: Vec<ScoredSnippet> = self
            .evidence
            .chunks()
            .iter()
            .filter_map(|chunk| {
                let direct = self.direct_score(&query, chunk);
                let semantic = self.semantic_score(&embedding, chunk);
                if direct <= 0.0 && semantic <= 0.0 {
                    return None;
                }
                Some(self.snippet(chunk, direct, semantic))
            })
            .collect();

        let considered = candidates.len();
        let ranked = self.rank(candidates, k);
        debug!(topic, considered, returned = ranked.len(), "retrieved evidence");
        Ok(ranked)
    }

    /// Evidence connecting two topics.
    ///
    /// A slide or page qualifies when it names both topics (or a synonym of
    /// each) anywhere in its title and body; its chunks that name either
    /// topic are scored against the centroid of both topic embeddings.
    /// `Shared` always carries at least one snippet, so `k` must be at
    /// least 1.
    pub fn retrieve_pair(
        &self,
        first: &str,
        second: &str,
        k: usize,
    ) -> ConceptMapResult<ConnectionEvidence> {
        if k == 0 {
            return Err(ConceptMapError::InvalidQuery(
                "pairwise queries need k of at least 1".to_string(),
            ));
        }
        let a = self.prepare(first);
        let b = self.prepare(second);
        if a.phrase.is_empty() || b.phrase.is_empty() {
            return Ok(ConnectionEvidence::NoSharedEvidence);
        }

        let mut segments: HashMap<&Location, (bool, bool)> = HashMap::new();
        for chunk in self.evidence.chunks() {
            let seen = segments.entry(&chunk.location).or_default();
            seen.0 |= a.mentioned_in(chunk);
            seen.1 |= b.mentioned_in(chunk);
        }

        let shared: Vec<&EvidenceChunk> = self
            .evidence
            .chunks()
            .iter()
            .filter(|chunk| segments.get(&chunk.location) == Some(&(true, true)))
            .filter(|chunk| a.mentioned_in(chunk) || b.mentioned_in(chunk))
            .collect();
        if shared.is_empty() {
            debug!(first, second, "no shared evidence");
            return Ok(ConnectionEvidence::NoSharedEvidence);
        }

        let vectors = self.queries.embed_batch(&[a.phrase.as_str(), b.phrase.as_str()])?;
        let query = centroid(&[&vectors[0], &vectors[1]]);

        let candidates = shared
            .into_iter()
            .map(|chunk| {
                let direct = self.direct_score(&a, chunk) + self.direct_score(&b, chunk);
                self.snippet(chunk, direct, self.semantic_score(&query, chunk))
            })
            .collect();
        let snippets = self.rank(candidates, k);
        debug!(first, second, returned = snippets.len(), "retrieved pair evidence");

        Ok(ConnectionEvidence::Shared {
            snippets,
            relation: self.relation(first, second),
        })
    }

    fn prepare(&self, topic: &str) -> TopicQuery<'_> {
        TopicQuery {
            phrase: text::normalize(topic),
            words: text::significant_words(topic),
            synonyms: self.synonyms.synonyms_for(topic),
        }
    }

    fn relation(&self, first: &str, second: &str) -> Option<Edge> {
        let graph = self.graph?;
        let (a, b) = (TopicKey::new(first), TopicKey::new(second));
        graph.edge(&a, &b).or_else(|| graph.edge(&b, &a)).cloned()
    }

    /// Exact phrase, or else shared significant words; plus each synonym
    /// found in the chunk.
    fn direct_score(&self, query: &TopicQuery<'_>, chunk: &EvidenceChunk) -> f64 {
        let haystack = chunk.normalized_text();
        let mut score = if text::contains_phrase(haystack, &query.phrase) {
            self.config.exact_phrase
        } else {
            let chunk_words = text::significant_words(haystack);
            let shared = query.words.intersection(&chunk_words).count();
            shared as f64 * self.config.word_overlap
        };
        for synonym in &query.synonyms {
            if text::contains_phrase(haystack, synonym) {
                score += self.config.synonym;
            }
        }
        score
    }

    fn semantic_score(&self, query: &[f32], chunk: &EvidenceChunk) -> f64 {
        let similarity = cosine_similarity(query, chunk.embedding()) as f64;
        similarity.clamp(0.0, 1.0) * self.config.semantic_scale
    }

    fn structural_score(&self, chunk: &EvidenceChunk) -> f64 {
        let marks = chunk.marks;
        let mut score = 0.0;
        if marks.title {
            score += self.config.title_bonus;
        }
        if marks.objectives {
            score += self.config.objectives_bonus;
        }
        if marks.summary {
            score += self.config.summary_bonus;
        }
        if marks.example {
            score += self.config.example_bonus;
        }
        score
    }

    fn snippet(&self, chunk: &EvidenceChunk, direct: f64, semantic: f64) -> ScoredSnippet {
        let breakdown = ScoreBreakdown {
            direct,
            semantic,
            structural: self.structural_score(chunk),
        };
        ScoredSnippet {
            chunk: chunk.clone(),
            score: breakdown.total(),
            breakdown,
        }
    }

    /// Sort by score descending then position, drop near-duplicates, keep `k`.
    fn rank(&self, mut candidates: Vec<ScoredSnippet>, k: usize) -> Vec<ScoredSnippet> {
        candidates.sort_by(|x, y| {
            y.score
                .partial_cmp(&x.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.chunk.position.cmp(&y.chunk.position))
        });

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|s| {
                let prefix: String = s
                    .chunk
                    .normalized_text()
                    .chars()
                    .take(self.config.dedup_prefix_chars)
                    .collect();
                seen.insert(prefix)
            })
            .take(k)
            .collect()
    }
}
