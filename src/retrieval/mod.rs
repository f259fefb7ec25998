//! Evidence retrieval
//!
//! Ranked snippet search over an [`EvidenceCorpus`](crate::corpus::EvidenceCorpus),
//! for a single topic or for the connection between two topics.

mod retriever;
mod synonyms;

pub use retriever::{ConnectionEvidence, EvidenceRetriever, ScoreBreakdown, ScoredSnippet};
pub use synonyms::SynonymTable;
