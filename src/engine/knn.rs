//! k-nearest-neighbour classification over learned embeddings.
//!
//! Embeddings are L2-normalised on the way in, so the dot product of two of
//! them is their cosine similarity.  The `k` most similar examples vote on
//! the label with the same first-occurrence tie-break the label smoother
//! uses, scanning from most to least similar: on a tie the nearest wins.

use crate::camera::Frame;
use crate::stats::most_common;

use super::embedder::{Embedder, Embedding, EmbeddingEngine, EngineError};

/// Default number of neighbours that vote.
pub const DEFAULT_K: usize = 3;

// ---------------------------------------------------------------------------
// ExampleSet
// ---------------------------------------------------------------------------

/// Learned `(embedding, label)` pairs in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExampleSet {
    embeddings: Vec<Embedding>,
    labels: Vec<usize>,
}

impl ExampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, embedding: Embedding, label: usize) {
        self.embeddings.push(embedding);
        self.labels.push(label);
    }

    pub fn clear(&mut self) {
        self.embeddings.clear();
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Majority label among the `k` examples most similar to `query`.
    pub fn nearest_label(&self, query: &[f32], k: usize) -> Option<usize> {
        if self.is_empty() || k == 0 {
            return None;
        }

        let mut scored: Vec<(f32, usize)> = self
            .embeddings
            .iter()
            .zip(&self.labels)
            .map(|(emb, &label)| (dot(emb, query), label))
            .collect();
        // Stable: equal similarities keep insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        most_common(scored.into_iter().take(k).map(|(_, label)| label))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length; zero vectors are returned unchanged.
pub fn l2_normalize(mut v: Embedding) -> Embedding {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

// ---------------------------------------------------------------------------
// KnnEmbeddingEngine
// ---------------------------------------------------------------------------

/// [`EmbeddingEngine`] backed by an [`Embedder`] and an [`ExampleSet`].
///
/// # Example
///
/// ```rust,no_run
/// use teachable_machine::config::ModelConfig;
/// use teachable_machine::engine::{EmbeddingEngine, KnnEmbeddingEngine, TractEmbedder};
///
/// let config = ModelConfig::default();
/// let embedder = TractEmbedder::load("models/mobilenet_v2.onnx", &config)
///     .expect("model not found");
/// let engine = KnnEmbeddingEngine::new(embedder, config.k);
/// assert_eq!(engine.example_count(), 0);
/// ```
pub struct KnnEmbeddingEngine<E> {
    embedder: E,
    examples: ExampleSet,
    k: usize,
}

impl<E: Embedder> KnnEmbeddingEngine<E> {
    /// # Panics
    ///
    /// Panics if `k == 0`.
    pub fn new(embedder: E, k: usize) -> Self {
        assert!(k > 0, "kNN needs at least one neighbour");
        Self {
            embedder,
            examples: ExampleSet::new(),
            k,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl<E: Embedder> EmbeddingEngine for KnnEmbeddingEngine<E> {
    fn embed(&self, frame: &Frame) -> Result<Embedding, EngineError> {
        self.embedder.embed(frame).map(l2_normalize)
    }

    fn knn_label(&self, embedding: &[f32]) -> Option<usize> {
        self.examples.nearest_label(embedding, self.k)
    }

    fn add_example(&mut self, embedding: Embedding, label: usize) {
        self.examples.add(embedding, label);
    }

    fn clear(&mut self) {
        self.examples.clear();
    }

    fn example_count(&self) -> usize {
        self.examples.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
