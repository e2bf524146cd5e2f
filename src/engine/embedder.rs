//! Core embedding traits and errors.
//!
//! # Overview
//!
//! [`Embedder`] turns a frame into a raw feature vector.  It is the only
//! part that touches a neural network; [`TractEmbedder`] is the production
//! implementation.
//!
//! [`EmbeddingEngine`] is the capability the frame loop consumes: embed a
//! frame, classify an embedding against the learned examples, and add or
//! clear examples.  [`KnnEmbeddingEngine`] implements it on top of any
//! [`Embedder`].
//!
//! [`MockEmbedder`] (available under `#[cfg(test)]`) maps a frame to its
//! mean colour, which is enough to tell solid test frames apart without a
//! model file.
//!
//! [`TractEmbedder`]: crate::engine::TractEmbedder
//! [`KnnEmbeddingEngine`]: crate::engine::KnnEmbeddingEngine

use thiserror::Error;

use crate::camera::Frame;

/// Feature vector produced for one frame.
pub type Embedding = Vec<f32>;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// All errors that can arise from the embedding subsystem.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The model file exists but could not be parsed or optimised.
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Running the model on a frame failed.
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Frame has unusable geometry {width}x{height}")]
    FrameGeometry { width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

/// Frame → feature vector.
pub trait Embedder: Send {
    fn embed(&self, frame: &Frame) -> Result<Embedding, EngineError>;
}

// ---------------------------------------------------------------------------
// EmbeddingEngine
// ---------------------------------------------------------------------------

/// Embedding plus nearest-neighbour classification over a mutable example
/// set.
///
/// The example set is owned by the engine and only changes through
/// [`add_example`](Self::add_example) and [`clear`](Self::clear).
pub trait EmbeddingEngine: Send {
    /// Compute the embedding of `frame`.
    fn embed(&self, frame: &Frame) -> Result<Embedding, EngineError>;

    /// Label of the nearest learned examples, `None` while none exist.
    fn knn_label(&self, embedding: &[f32]) -> Option<usize>;

    /// Learn `embedding` as an example of class `label`.
    fn add_example(&mut self, embedding: Embedding, label: usize);

    /// Forget every learned example.
    fn clear(&mut self);

    fn example_count(&self) -> usize;
}

// Compile-time assertion: Box<dyn EmbeddingEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn EmbeddingEngine>) {}
};

// ---------------------------------------------------------------------------
// MockEmbedder  (test-only)
// ---------------------------------------------------------------------------

/// Test double: the embedding is the frame's mean `[r, g, b]` in `[0, 1]`.
#[cfg(test)]
pub struct MockEmbedder {
    failure: Option<EngineError>,
}

#[cfg(test)]
impl MockEmbedder {
    pub fn new() -> Self {
        Self { failure: None }
    }

    /// A mock whose every call fails with `error`.
    pub fn failing(error: EngineError) -> Self {
        Self {
            failure: Some(error),
        }
    }
}

#[cfg(test)]
impl Embedder for MockEmbedder {
    fn embed(&self, frame: &Frame) -> Result<Embedding, EngineError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        let pixels = (frame.width() * frame.height()).max(1) as f32;
        let mut sums = [0.0_f32; 3];
        for pixel in frame.pixels() {
            for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += channel as f32;
            }
        }
        Ok(sums.iter().map(|s| s / pixels / 255.0).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
