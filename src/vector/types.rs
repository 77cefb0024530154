//! Core types and errors for the vector layer.
//!
//! Distances are squared Euclidean values as reported by the flat index.
//! Similarities are derived from them with `1 / (1 + distance)` so that a
//! smaller distance always maps to a strictly larger similarity.

use thiserror::Error;

/// Nearest neighbors returned by a flat index query.
///
/// `distances[i]` belongs to `indices[i]`; both vectors are ordered by
/// ascending distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub indices: Vec<usize>,
}

impl Neighbors {
    /// Number of neighbors returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates `(distance, index)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
        self.distances
            .iter()
            .copied()
            .zip(self.indices.iter().copied())
    }
}

/// Converts a raw distance into a similarity in `(0.0, 1.0]`.
#[must_use]
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// Errors that can occur during vector operations.
///
/// All error messages include actionable suggestions for resolution.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure all vectors use the same embedding strategy"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "Embedding model '{model}' is unavailable: {reason}\nSuggestion: Check network access for the first download or configure the term_frequency strategy"
    )]
    ModelUnavailable { model: String, reason: String },

    #[error(
        "Embedding generation failed: {0}\nSuggestion: Verify the embedding model is properly initialized"
    )]
    EmbeddingFailed(String),

    #[error(
        "No embedding strategy could be initialized\nSuggestion: Add 'term_frequency' to embedding.strategies"
    )]
    NoStrategy,

    #[error("Storage error: {0}\nSuggestion: Check disk space and file permissions")]
    Storage(#[from] std::io::Error),

    #[error("Invalid index format: {0}\nSuggestion: Rebuild the index with 'refuge index'")]
    InvalidFormat(String),

    #[error(
        "Serialization error: {0}\nSuggestion: Check that vector data is valid and not corrupted"
    )]
    Serialization(String),

    #[error(
        "Invalid storage version: expected {expected}, got {actual}\nSuggestion: Rebuild the index with the current version"
    )]
    VersionMismatch { expected: u32, actual: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_from_distance() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
        assert_eq!(similarity_from_distance(1.0), 0.5);
        assert!(similarity_from_distance(0.5) > similarity_from_distance(0.75));
    }

    #[test]
    fn test_neighbors_iter_pairs_in_order() {
        let neighbors = Neighbors {
            distances: vec![0.1, 0.4],
            indices: vec![3, 0],
        };
        let pairs: Vec<_> = neighbors.iter().collect();
        assert_eq!(pairs, vec![(0.1, 3), (0.4, 0)]);
        assert_eq!(neighbors.len(), 2);
        assert!(!neighbors.is_empty());
    }
}
