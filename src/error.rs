//! Error types for the retrieval engine
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Vector-level errors live in
//! [`crate::vector::VectorError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::vector::VectorError;

/// Errors raised while reading a source corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list corpus directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Malformed record file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not decode '{path}' with any of the encodings {encodings:?}")]
    Undecodable {
        path: PathBuf,
        encodings: Vec<String>,
    },
}

/// Errors specific to snapshot persistence
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Artifact '{path}' is missing")]
    MissingArtifact { path: PathBuf },

    #[error("Failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error(
        "Snapshot is inconsistent: {documents} documents, {metadata} metadata entries, {rows} index rows"
    )]
    Inconsistent {
        documents: usize,
        metadata: usize,
        rows: usize,
    },

    #[error("Index was built from different documents than the ones stored next to it")]
    FingerprintMismatch,

    #[error("Vector storage error: {0}")]
    Vector(#[from] VectorError),
}

/// Errors surfaced by index building and the admin commands.
///
/// Query paths never return these; they degrade to fallback search instead.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No index is loaded")]
    NotLoaded,

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Vector(#[from] VectorError),
}

impl StorageError {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileWrite { .. } => vec![
                "Check disk space and permissions in the index directory",
                "Verify that index_root in .refuge/settings.toml is writable",
            ],
            Self::MissingArtifact { .. } | Self::FileRead { .. } => vec![
                "Run 'refuge index <corpus>' to build the index",
                "Queries keep working through fallback search until then",
            ],
            Self::Decode { .. }
            | Self::Inconsistent { .. }
            | Self::FingerprintMismatch
            | Self::Vector(_) => vec![
                "Run 'refuge index <corpus> --force' to rebuild from scratch",
                "Check for disk errors or an interrupted copy of the index directory",
            ],
        }
    }
}

impl SearchError {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::NotLoaded => vec!["Run 'refuge index <corpus>' to build the index"],
            Self::Corpus(CorpusError::Undecodable { .. }) => {
                vec!["Add the file's encoding to first_aid.encodings in .refuge/settings.toml"]
            }
            Self::Corpus(_) => vec![
                "Check that the corpus path in .refuge/settings.toml exists",
                "Ensure the files are readable and contain valid JSON",
            ],
            Self::Storage(e) => e.recovery_suggestions(),
            Self::Vector(_) => vec![
                "Add 'term_frequency' to embedding.strategies to build without a model",
            ],
        }
    }
}

/// Result type alias for corpus operations
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, SearchError>;
