//! Vector layer: embeddings, the exact flat index and its binary artifact.
//!
//! # Architecture
//! Documents are encoded by an [`EmbeddingGenerator`] into fixed-length
//! vectors, appended to a [`FlatIndex`] in document order, and written to
//! disk as an [`IndexArtifact`]. Row `i` of the index always belongs to
//! document `i`; nothing in this layer reorders or filters rows.

mod embedding;
mod engine;
mod storage;
mod types;

pub use embedding::{
    EmbedderDescriptor, EmbeddingGenerator, EmbeddingStrategy, FastEmbedGenerator,
    TermFrequencyGenerator, parse_embedding_model, select_generator, tokenize,
};
pub use engine::{FlatIndex, squared_l2};
pub use storage::{FINGERPRINT_LEN, IndexArtifact, STORAGE_VERSION};
pub use types::{Neighbors, VectorError, similarity_from_distance};
