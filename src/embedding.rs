//! Text embeddings
//!
//! Semantic similarity (graph building) and semantic relevance (retrieval)
//! both go through the [`Embedder`] trait, so the pipeline can run on the
//! deterministic [`HashingEmbedder`] in tests and on fastembed in production.

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Error type for embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The embedding model returned no results
    #[error("embedding returned no results")]
    EmptyResult,

    /// The model returned a different number of vectors than texts
    #[error("embedding returned {got} vectors for {expected} texts")]
    CountMismatch { expected: usize, got: usize },

    /// Model loading or inference failed
    #[error("embedding model error: {0}")]
    ModelError(String),
}

/// Trait for embedding text into vectors.
///
/// Implementations must return exactly one vector per input text, in order.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResult)
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}

/// Deterministic bag-of-words embedder using feature hashing.
///
/// Each lowercased alphanumeric word is hashed into one of `dimensions`
/// buckets; the resulting vector is L2-normalized. Texts sharing words
/// have positive cosine similarity, disjoint texts have zero. Needs no
/// model download and is stable across runs, which makes it the default
/// backend.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashingEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Memoizing wrapper: each distinct text is embedded at most once.
///
/// Only cache misses are forwarded to the inner embedder, in one batch.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: DashMap<String, Vec<f32>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of distinct texts cached so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut missing: Vec<&str> = Vec::new();
        for text in texts {
            if !self.cache.contains_key(*text) && !missing.contains(text) {
                missing.push(text);
            }
        }

        if !missing.is_empty() {
            let vectors = self.inner.embed_batch(&missing)?;
            if vectors.len() != missing.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: missing.len(),
                    got: vectors.len(),
                });
            }
            for (text, vector) in missing.into_iter().zip(vectors) {
                self.cache.insert(text.to_string(), vector);
            }
        }

        texts
            .iter()
            .map(|t| {
                self.cache
                    .get(*t)
                    .map(|v| v.value().clone())
                    .ok_or(EmbeddingError::EmptyResult)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FastEmbedEmbedder — production embedder behind `embeddings` feature
// ---------------------------------------------------------------------------

#[cfg(feature = "embeddings")]
mod fastembed_impl {
    use super::{Embedder, EmbeddingError};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::Mutex;

    /// Embedder backed by fastembed (ONNX Runtime).
    ///
    /// `TextEmbedding::embed` needs `&mut self`, hence the `Mutex`.
    pub struct FastEmbedEmbedder {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedEmbedder {
        pub fn new(model: EmbeddingModel) -> Result<Self, EmbeddingError> {
            let options = InitOptions::new(model).with_show_download_progress(false);
            let embedding = TextEmbedding::try_new(options)
                .map_err(|e| EmbeddingError::ModelError(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(embedding),
            })
        }

        /// all-MiniLM-L6-v2, small enough for lecture-sized corpora.
        pub fn default_model() -> Result<Self, EmbeddingError> {
            Self::new(EmbeddingModel::AllMiniLML6V2)
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self
                .model
                .lock()
                .map_err(|e| EmbeddingError::ModelError(e.to_string()))?;
            let embeddings = model
                .embed(texts.to_vec(), None)
                .map_err(|e| EmbeddingError::ModelError(e.to_string()))?;
            if embeddings.is_empty() {
                return Err(EmbeddingError::EmptyResult);
            }
            Ok(embeddings)
        }
    }
}

#[cfg(feature = "embeddings")]
pub use fastembed_impl::FastEmbedEmbedder;

/// Cosine similarity between two vectors; 0.0 when either is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Element-wise mean of a set of vectors.
pub fn centroid(vectors: &[&[f32]]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f32; first.len()];
    for v in vectors {
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += x;
        }
    }
    let n = vectors.len() as f32;
    sum.iter_mut().for_each(|s| *s /= n);
    sum
}
