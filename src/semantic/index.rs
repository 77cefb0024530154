//! A built corpus: documents, metadata and their vectors.
//!
//! `SemanticIndex` owns the position-aligned triple produced by a build or
//! restored from a snapshot, plus the embedding generator that encodes
//! queries into the same vector space.

use std::path::Path;

use crate::config::EmbeddingConfig;
use crate::error::{SearchError, ServiceResult};
use crate::semantic::storage::{load_snapshot, save_snapshot};
use crate::semantic::{Metadata, PreparedCorpus};
use crate::vector::{
    EmbedderDescriptor, EmbeddingGenerator, FlatIndex, Neighbors, VectorError, select_generator,
};

/// Documents encoded per batch while building.
pub const BUILD_BATCH_SIZE: usize = 64;

#[derive(Default)]
pub struct SemanticIndex {
    index: Option<FlatIndex>,
    descriptor: Option<EmbedderDescriptor>,
    documents: Vec<String>,
    metadata: Vec<Metadata>,
    /// Absent when the strategy of a loaded index cannot be recreated
    embedder: Option<Box<dyn EmbeddingGenerator>>,
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("size", &self.size())
            .field("descriptor", &self.descriptor.as_ref().map(|d| d.label()))
            .field("has_embedder", &self.embedder.is_some())
            .finish()
    }
}

impl SemanticIndex {
    /// An index with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes a prepared corpus with the first strategy that initializes.
    pub fn build(prepared: PreparedCorpus, config: &EmbeddingConfig) -> Result<Self, VectorError> {
        Self::build_with_progress(prepared, config, |_, _| {})
    }

    /// Like [`build`](Self::build), reporting `(encoded, total)` after each
    /// batch.
    pub fn build_with_progress<F>(
        prepared: PreparedCorpus,
        config: &EmbeddingConfig,
        mut progress: F,
    ) -> Result<Self, VectorError>
    where
        F: FnMut(usize, usize),
    {
        let PreparedCorpus {
            documents,
            metadata,
        } = prepared;
        let texts: Vec<&str> = documents.iter().map(String::as_str).collect();

        let embedder = select_generator(&config.strategies, config, &texts)?;
        let mut index = FlatIndex::new(embedder.dimension());

        let total = texts.len();
        for batch in texts.chunks(BUILD_BATCH_SIZE) {
            let vectors = embedder.encode(batch)?;
            index.add(&vectors)?;
            progress(index.size(), total);
        }

        tracing::info!(
            "Built index with {} documents ({})",
            index.size(),
            embedder.descriptor().label()
        );

        Ok(Self {
            index: Some(index),
            descriptor: Some(embedder.descriptor()),
            documents,
            metadata,
            embedder: Some(embedder),
        })
    }

    /// Writes the current triple to `dir`.
    pub fn save(&self, dir: &Path) -> ServiceResult<()> {
        let (Some(index), Some(descriptor)) = (&self.index, &self.descriptor) else {
            return Err(SearchError::NotLoaded);
        };
        save_snapshot(dir, index, descriptor, &self.documents, &self.metadata)?;
        Ok(())
    }

    /// Replaces the in-memory state with the snapshot in `dir`.
    ///
    /// Returns `false` and leaves the index empty when any artifact is
    /// missing or inconsistent. A snapshot whose embedding strategy cannot be
    /// recreated still loads; queries against it then fail over to fallback
    /// search.
    pub fn load(&mut self, dir: &Path, config: &EmbeddingConfig) -> bool {
        *self = Self::new();

        let snapshot = match load_snapshot(dir) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Could not load index from {}: {e}", dir.display());
                return false;
            }
        };

        let embedder = match snapshot.descriptor.restore(config) {
            Ok(embedder) if embedder.dimension() == snapshot.index.dimension() => Some(embedder),
            Ok(embedder) => {
                tracing::warn!(
                    "Restored embedder has dimension {}, index expects {}",
                    embedder.dimension(),
                    snapshot.index.dimension()
                );
                None
            }
            Err(e) => {
                tracing::warn!("Query encoder unavailable: {e}");
                None
            }
        };

        tracing::debug!(
            "Loaded {} documents from {}",
            snapshot.documents.len(),
            dir.display()
        );

        *self = Self {
            index: Some(snapshot.index),
            descriptor: Some(snapshot.descriptor),
            documents: snapshot.documents,
            metadata: snapshot.metadata,
            embedder,
        };
        true
    }

    /// Nearest neighbors of `query`, at most `k`.
    pub fn search(&self, query: &str, k: usize) -> ServiceResult<Neighbors> {
        let (Some(index), Some(embedder)) = (&self.index, &self.embedder) else {
            return Err(SearchError::NotLoaded);
        };
        let vector = embedder.encode_one(query)?;
        Ok(index.search(&vector, k)?)
    }

    /// True when a built or loaded triple is present.
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Number of indexed documents.
    pub fn size(&self) -> usize {
        self.index.as_ref().map_or(0, FlatIndex::size)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.index.as_ref().map(FlatIndex::dimension)
    }

    pub fn descriptor(&self) -> Option<&EmbedderDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Document and metadata at `position`, if in bounds.
    pub fn entry(&self, position: usize) -> Option<(&str, &Metadata)> {
        let document = self.documents.get(position)?;
        let metadata = self.metadata.get(position)?;
        Some((document.as_str(), metadata))
    }

    /// Simulates metadata that no longer covers every index row.
    #[cfg(test)]
    pub(crate) fn truncate_metadata(&mut self, len: usize) {
        self.metadata.truncate(len);
    }
}
