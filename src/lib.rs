//! conceptmap: topic importance and concept graphs for course material
//!
//! Turns extracted slide/page text into a ranked list of topics and a
//! directed concept graph relating them, then answers evidence queries
//! for a topic or a topic pair.
//!
//! # Core Concepts
//!
//! - **Corpus**: ordered TextUnits (title/body/objectives/summary roles)
//! - **Topics**: candidates scored from structural signals, classified into
//!   `exam_critical`, `core` and `extra` tiers from the score distribution
//! - **Concept graph**: multi-signal weighted edges, cycle-free and
//!   transitively reduced
//! - **Evidence**: ranked text snippets grounding a topic or a connection
//!
//! # Example
//!
//! ```
//! use conceptmap::{AnalysisInput, AnalysisPipeline, DocumentInput, DocumentSet, SlideRecord};
//!
//! let documents = DocumentSet::new(vec![DocumentInput::slides(
//!     "lecture-1",
//!     vec![
//!         SlideRecord::new("Recursion", "Recursion solves a problem through smaller copies."),
//!         SlideRecord::new("Base Case", "Every recursion needs a base case."),
//!     ],
//! )]);
//! let pipeline = AnalysisPipeline::with_defaults();
//! let bundle = pipeline.analyze(&AnalysisInput::new(documents)).unwrap();
//! let evidence = pipeline.retriever(&bundle).retrieve("recursion", 3).unwrap();
//! assert!(!evidence.is_empty());
//! ```

pub mod collaborator;
pub mod config;
pub mod corpus;
pub mod embedding;
mod error;
pub mod graph;
pub mod pipeline;
pub mod rerank;
pub mod retrieval;
pub mod topics;

pub use collaborator::{
    CollaboratorError, Judgment, RelationshipJudge, RelationshipJudgment, TopicSuggester,
    TopicSuggestion,
};
pub use config::ConceptMapConfig;
pub use corpus::{
    Corpus, DocumentInput, DocumentSet, EvidenceChunk, EvidenceCorpus, Location, Role,
    SignalExtractor, SlideRecord, TextUnit,
};
pub use embedding::{CachedEmbedder, Embedder, EmbeddingError, HashingEmbedder};
pub use error::{ConceptMapError, ConceptMapResult};
pub use graph::{BuildReport, ConceptGraph, Edge, GraphBuilder, GraphNode, SignalKind};
pub use pipeline::{AnalysisBundle, AnalysisInput, AnalysisPipeline};
pub use rerank::CentralityReranker;
pub use retrieval::{ConnectionEvidence, EvidenceRetriever, ScoreBreakdown, ScoredSnippet};
pub use topics::{Tier, TierThresholds, TopicCandidate, TopicKey, TopicScorer, TopicSet};

#[cfg(feature = "embeddings")]
pub use embedding::FastEmbedEmbedder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
