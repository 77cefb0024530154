//! Semantic retrieval over a prepared corpus
//!
//! This module turns record groups into documents and metadata, builds and
//! persists the vector index over them, and answers queries with re-ranking
//! and literal fallback.

mod document;
mod fallback;
mod index;
mod metadata;
mod search;
mod storage;

pub use document::{
    FIELD_DELIMITER, PreparedCorpus, SemanticField, normalize, prepare_corpus, render_document,
};
pub use fallback::FallbackMatcher;
pub use index::{BUILD_BATCH_SIZE, SemanticIndex};
pub use metadata::{FULL_DATA_KEY, Metadata};
pub use search::{
    RerankPolicy, SearchOptions, SearchOrchestrator, SearchResult, partition_by_field,
};
pub use storage::{
    DOCUMENTS_FILE, INDEX_FILE, METADATA_FILE, Snapshot, document_fingerprint, load_snapshot,
    save_snapshot, snapshot_exists,
};
