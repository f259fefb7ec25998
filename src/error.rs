//! Crate-wide error type

use crate::collaborator::CollaboratorError;
use crate::embedding::EmbeddingError;
use thiserror::Error;

/// Errors that can occur while preparing or running an analysis.
///
/// Conditions the pipeline recovers from (empty corpus, degenerate score
/// distribution, cyclic signal graph, missing shared evidence) are not
/// errors; they are reported on the returned structures and logged.
#[derive(Debug, Error)]
pub enum ConceptMapError {
    #[error("Invalid input in document '{document}' at position {position}: {reason}")]
    Validation {
        document: String,
        position: usize,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl ConceptMapError {
    pub(crate) fn validation(
        document: impl Into<String>,
        position: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            document: document.into(),
            position,
            reason: reason.into(),
        }
    }
}

/// Result type for conceptmap operations
pub type ConceptMapResult<T> = Result<T, ConceptMapError>;
