//! Document normalization.
//!
//! A record is rendered into one searchable string by visiting its semantic
//! fields in a fixed order and joining the non-empty ones as `label: value`.
//! Field order is part of the index contract: changing it changes every
//! embedding, so it only ever changes together with a rebuild.

use crate::corpus::{RecordGroup, SearchableRecord};
use crate::semantic::Metadata;

/// Separator between rendered fields.
pub const FIELD_DELIMITER: &str = " | ";

/// One labelled value contributing to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticField {
    pub label: &'static str,
    pub value: String,
}

impl SemanticField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }

    /// A field whose value is only emitted when `present` holds.
    pub fn when(label: &'static str, present: bool, value: impl FnOnce() -> String) -> Self {
        let value = if present { value() } else { String::new() };
        Self { label, value }
    }

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Joins the non-empty fields into a document string.
pub fn render_document(fields: &[SemanticField]) -> String {
    fields
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| format!("{}: {}", field.label, field.value))
        .collect::<Vec<_>>()
        .join(FIELD_DELIMITER)
}

/// Renders a single record under its group key.
pub fn normalize<R: SearchableRecord>(record: &R, group_key: &str) -> String {
    render_document(&record.semantic_fields(group_key))
}

/// Documents and metadata for a whole corpus, position-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedCorpus {
    pub documents: Vec<String>,
    pub metadata: Vec<Metadata>,
}

impl PreparedCorpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Renders every record of every group in encounter order.
///
/// Entry `i` of `documents` and entry `i` of `metadata` always describe the
/// same record; the position passed to [`SearchableRecord::metadata`] is that
/// shared index.
pub fn prepare_corpus<R: SearchableRecord>(groups: &[RecordGroup<R>]) -> PreparedCorpus {
    let mut prepared = PreparedCorpus::default();

    for group in groups {
        for record in &group.items {
            let position = prepared.documents.len();
            prepared.documents.push(normalize(record, &group.key));
            prepared.metadata.push(record.metadata(&group.key, position));
        }
    }

    tracing::debug!(
        "Prepared {} documents from {} groups",
        prepared.len(),
        groups.len()
    );
    prepared
}
