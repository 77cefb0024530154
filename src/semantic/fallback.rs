//! Literal fallback search over the source records.
//!
//! Used when no index is loaded, when the vector path fails, and when the
//! vector ranking produced no domain match. A record matches when any of
//! these hold (all comparisons lower-cased):
//! - the query contains the group key, or the group key contains the query
//! - the query is a substring of one of the record's literal fields
//! - one of the configured keywords appears in the query
//!
//! Matches are emitted in source order with distance `0.0`.

use crate::corpus::{RecordGroup, SearchableRecord};
use crate::semantic::{SearchResult, normalize};

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackMatcher {
    keywords: Vec<String>,
    limit: usize,
}

impl FallbackMatcher {
    pub fn new(keywords: &[String], limit: usize) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            limit,
        }
    }

    /// Scans `groups` in order and returns at most `limit` matches.
    pub fn search<R: SearchableRecord>(
        &self,
        groups: &[RecordGroup<R>],
        query: &str,
    ) -> Vec<SearchResult> {
        let query = query.to_lowercase();
        let keyword_hit = self.keywords.iter().any(|k| query.contains(k.as_str()));

        let mut results = Vec::new();
        let mut position = 0;

        'groups: for group in groups {
            let key = group.key.to_lowercase();
            let group_hit = !key.is_empty() && (query.contains(&key) || key.contains(&query));

            for record in &group.items {
                if results.len() >= self.limit {
                    break 'groups;
                }

                if group_hit || keyword_hit || literal_hit(record, &query) {
                    results.push(SearchResult::exact(
                        results.len() + 1,
                        normalize(record, &group.key),
                        record.metadata(&group.key, position),
                    ));
                }
                position += 1;
            }
        }

        tracing::debug!("Fallback search matched {} records", results.len());
        results
    }
}

fn literal_hit<R: SearchableRecord>(record: &R, query: &str) -> bool {
    record
        .literal_fields()
        .into_iter()
        .any(|field| !field.is_empty() && field.to_lowercase().contains(query))
}
