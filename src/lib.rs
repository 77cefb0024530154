//! Semantic retrieval for disaster assembly areas and first-aid knowledge.
pub mod cache;
pub mod config;
pub mod corpus;
pub mod display;
pub mod error;
pub mod logging;
pub mod query;
pub mod semantic;
pub mod service;
pub mod vector;

// Explicit exports for better API clarity
pub use cache::ResultCache;
pub use config::Settings;
pub use corpus::{AssemblyArea, CorpusKind, FirstAidSection, RecordGroup, SearchableRecord};
pub use error::{
    CorpusError, CorpusResult, SearchError, ServiceResult, StorageError, StorageResult,
};
pub use semantic::{Metadata, SearchOrchestrator, SearchResult, SemanticIndex};
pub use service::{CorpusProfile, SearchService};
pub use vector::{EmbeddingStrategy, VectorError};
