pub mod embedder;
pub mod knn;
pub mod tract;

pub use embedder::{Embedder, Embedding, EmbeddingEngine, EngineError};
pub use knn::{l2_normalize, ExampleSet, KnnEmbeddingEngine, DEFAULT_K};
pub use tract::TractEmbedder;

#[cfg(test)]
pub use embedder::MockEmbedder;
