//! Source corpora and the record contract the engine consumes.
//!
//! The engine works on [`RecordGroup`]s of records that implement
//! [`SearchableRecord`]. Everything specific to a source format lives in the
//! loaders of this module:
//! - [`areas`]: one JSON file per district with its assembly areas
//! - [`first_aid`]: a heading/body text file split into sections

pub mod areas;
pub mod encoding;
pub mod first_aid;

use serde::Serialize;

use crate::semantic::{Metadata, SemanticField};

pub use areas::{AssemblyArea, load_area_groups};
pub use first_aid::{FirstAidSection, SectionCategory, load_first_aid_groups, parse_sections};

/// Records sharing one grouping key, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup<R> {
    pub key: String,
    pub items: Vec<R>,
}

impl<R> RecordGroup<R> {
    pub fn new(key: impl Into<String>, items: Vec<R>) -> Self {
        Self {
            key: key.into(),
            items,
        }
    }
}

/// A record that can be normalized, indexed and matched literally.
pub trait SearchableRecord: Serialize + Send + Sync {
    /// Semantic fields in document order. Empty values are skipped when
    /// rendering.
    fn semantic_fields(&self, group_key: &str) -> Vec<SemanticField>;

    /// Metadata stored next to the document at `position`.
    fn metadata(&self, group_key: &str, position: usize) -> Metadata;

    /// Item-level values compared against the query by fallback search.
    fn literal_fields(&self) -> Vec<&str>;
}

/// The corpora served by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CorpusKind {
    /// Disaster assembly areas grouped by district
    Areas,
    /// First-aid knowledge sections
    FirstAid,
}

impl CorpusKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Areas => "areas",
            Self::FirstAid => "first-aid",
        }
    }
}

impl std::fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
