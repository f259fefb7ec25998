//! Evidence chunks: the retrieval view of a corpus
//!
//! Each TextUnit is word-wrapped into chunks of bounded length. Chunk
//! embeddings are computed once, in a single batch, when the evidence
//! corpus is built; queries only embed the query text.

use super::text;
use super::unit::{Location, Role};
use super::Corpus;
use crate::embedding::{Embedder, EmbeddingError};
use crate::error::ConceptMapResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

const EXAMPLE_MARKERS: &[&str] = &["example", "for instance", "consider", "suppose", "e.g."];

/// Structural signals attached to a chunk, used for the structural score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralMarks {
    pub title: bool,
    pub objectives: bool,
    pub summary: bool,
    pub example: bool,
}

impl StructuralMarks {
    fn for_unit(role: Role, normalized: &str) -> Self {
        Self {
            title: role.is_title(),
            objectives: role.is_objectives(),
            summary: role.is_summary(),
            example: EXAMPLE_MARKERS.iter().any(|m| normalized.contains(m)),
        }
    }
}

/// A retrievable piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    pub text: String,
    pub location: Location,
    pub role: Role,
    pub marks: StructuralMarks,
    /// Order of the chunk in the whole corpus; the retrieval tie-breaker
    pub position: usize,
    #[serde(skip)]
    pub(crate) normalized: String,
    #[serde(skip)]
    pub(crate) embedding: Vec<f32>,
}

impl EvidenceChunk {
    pub fn normalized_text(&self) -> &str {
        &self.normalized
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }
}

/// Read-only chunk collection, built once per document set.
#[derive(Debug, Clone, Default)]
pub struct EvidenceCorpus {
    chunks: Vec<EvidenceChunk>,
}

impl EvidenceCorpus {
    pub fn build(
        corpus: &Corpus,
        embedder: &dyn Embedder,
        chunk_chars: usize,
    ) -> ConceptMapResult<Self> {
        let mut chunks = Vec::new();
        for unit in corpus.units() {
            for piece in wrap(&unit.raw_text, chunk_chars) {
                let normalized = text::normalize(&piece);
                chunks.push(EvidenceChunk {
                    marks: StructuralMarks::for_unit(unit.role, &normalized),
                    location: unit.location.clone(),
                    role: unit.role,
                    position: chunks.len(),
                    text: piece,
                    normalized,
                    embedding: Vec::new(),
                });
            }
        }

        if !chunks.is_empty() {
            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let vectors = embedder.embed_batch(&texts)?;
            if vectors.len() != chunks.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: chunks.len(),
                    got: vectors.len(),
                }
                .into());
            }
            for (chunk, vector) in chunks.iter_mut().zip(vectors) {
                chunk.embedding = vector;
            }
        }

        debug!(units = corpus.len(), chunks = chunks.len(), "built evidence corpus");
        Ok(Self { chunks })
    }

    pub fn chunks(&self) -> &[EvidenceChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Greedy word wrap to at most `max_chars` characters per piece.
/// A single word longer than the limit becomes its own piece.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        if current_len > 0 && current_len + 1 + len > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += len;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
