//! Query orchestration: vector search, domain re-rank and fallback.
//!
//! For every query the orchestrator
//! 1. over-fetches neighbors from the loaded index,
//! 2. turns them into results, dropping positions the metadata does not
//!    cover,
//! 3. optionally moves results whose re-rank field matches the query to the
//!    front, keeping relative order on both sides,
//! 4. and falls back to literal matching when there is no index, when any
//!    step fails, or when re-ranking found no match at all.
//!
//! Searching never returns an error; the worst case is an empty list.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::corpus::{RecordGroup, SearchableRecord};
use crate::error::ServiceResult;
use crate::semantic::{FallbackMatcher, Metadata, SemanticIndex};
use crate::vector::similarity_from_distance;

/// One ranked answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based position in the final ordering
    pub rank: usize,
    /// Squared L2 distance, `0.0` for literal matches
    pub distance: f32,
    /// `1 / (1 + distance)`
    pub similarity: f32,
    pub document: String,
    pub metadata: Metadata,
}

impl SearchResult {
    pub fn new(rank: usize, distance: f32, document: String, metadata: Metadata) -> Self {
        Self {
            rank,
            distance,
            similarity: similarity_from_distance(distance),
            document,
            metadata,
        }
    }

    /// A literal match at distance zero.
    pub fn exact(rank: usize, document: String, metadata: Metadata) -> Self {
        Self::new(rank, 0.0, document, metadata)
    }
}

/// How vector results are reordered before truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RerankPolicy {
    /// Keep distance order
    None,
    /// Move results whose metadata field matches the query to the front
    Field(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Neighbors requested from the index
    pub over_fetch: usize,
    /// Results returned to the caller
    pub result_limit: usize,
    pub rerank: RerankPolicy,
    /// Keywords that make every record a fallback match
    pub fallback_keywords: Vec<String>,
}

impl SearchOptions {
    pub fn new(config: &SearchConfig, rerank: RerankPolicy, fallback_keywords: &[String]) -> Self {
        Self {
            over_fetch: config.over_fetch,
            result_limit: config.result_limit,
            rerank,
            fallback_keywords: fallback_keywords.to_vec(),
        }
    }
}

/// Outcome of the vector path before fallback is considered.
enum VectorOutcome {
    Ranked(Vec<SearchResult>),
    NoDomainMatch,
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    options: SearchOptions,
    fallback: FallbackMatcher,
}

impl SearchOrchestrator {
    pub fn new(options: SearchOptions) -> Self {
        let fallback = FallbackMatcher::new(&options.fallback_keywords, options.result_limit);
        Self { options, fallback }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Answers `query` from `index`, or from `groups` when the vector path
    /// cannot be trusted.
    pub fn search<R: SearchableRecord>(
        &self,
        index: &SemanticIndex,
        groups: &[RecordGroup<R>],
        query: &str,
    ) -> Vec<SearchResult> {
        match self.vector_search(index, query) {
            Ok(VectorOutcome::Ranked(results)) => results,
            Ok(VectorOutcome::NoDomainMatch) => {
                tracing::debug!("No re-rank match for '{query}', using fallback search");
                self.fallback.search(groups, query)
            }
            Err(e) => {
                tracing::warn!("Vector search unavailable, using fallback search: {e}");
                self.fallback.search(groups, query)
            }
        }
    }

    fn vector_search(&self, index: &SemanticIndex, query: &str) -> ServiceResult<VectorOutcome> {
        let neighbors = index.search(query, self.options.over_fetch)?;

        let mut results = Vec::with_capacity(neighbors.len());
        for (distance, position) in neighbors.iter() {
            let Some((document, metadata)) = index.entry(position) else {
                tracing::warn!("Dropping neighbor {position} outside the stored metadata");
                continue;
            };
            results.push(SearchResult::new(
                results.len() + 1,
                distance,
                document.to_string(),
                metadata.clone(),
            ));
        }

        let mut ranked = match &self.options.rerank {
            RerankPolicy::None => results,
            RerankPolicy::Field(field) => {
                let (matched, other) = partition_by_field(results, field, query);
                if matched.is_empty() {
                    return Ok(VectorOutcome::NoDomainMatch);
                }
                matched.into_iter().chain(other).collect()
            }
        };

        ranked.truncate(self.options.result_limit);
        for (i, result) in ranked.iter_mut().enumerate() {
            result.rank = i + 1;
        }
        Ok(VectorOutcome::Ranked(ranked))
    }
}

/// Splits results into those whose `field` matches `query` and the rest,
/// preserving order within each side.
///
/// A field matches when it is non-empty and, ignoring case, either contains
/// the query or is contained in it.
pub fn partition_by_field(
    results: Vec<SearchResult>,
    field: &str,
    query: &str,
) -> (Vec<SearchResult>, Vec<SearchResult>) {
    let query = query.to_lowercase();
    results.into_iter().partition(|result| {
        result
            .metadata
            .get_str(field)
            .map(str::to_lowercase)
            .is_some_and(|value| {
                !value.is_empty() && (query.contains(&value) || value.contains(&query))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::corpus::AssemblyArea;
    use crate::semantic::prepare_corpus;
    use crate::vector::EmbeddingStrategy;

    fn result(district: &str, distance: f32) -> SearchResult {
        let mut metadata = Metadata::new();
        metadata.insert("district", district);
        SearchResult::new(0, distance, format!("District: {district}"), metadata)
    }

    fn area(name: &str) -> AssemblyArea {
        AssemblyArea {
            name: name.to_string(),
            ..AssemblyArea::default()
        }
    }

    fn groups() -> Vec<RecordGroup<AssemblyArea>> {
        vec![
            RecordGroup::new("Beşiktaş", vec![area("park park park")]),
            RecordGroup::new("Kadıköy", vec![area("sahil")]),
            RecordGroup::new("Üsküdar", vec![area("park park meydan")]),
        ]
    }

    fn options(rerank: RerankPolicy) -> SearchOptions {
        SearchOptions {
            over_fetch: 20,
            result_limit: 5,
            rerank,
            fallback_keywords: vec!["toplanma".to_string()],
        }
    }

    fn built_index(groups: &[RecordGroup<AssemblyArea>]) -> SemanticIndex {
        let config = EmbeddingConfig {
            strategies: vec![EmbeddingStrategy::TermFrequency],
            ..EmbeddingConfig::default()
        };
        SemanticIndex::build(prepare_corpus(groups), &config).unwrap()
    }

    #[test]
    fn test_partition_is_stable() {
        let results = vec![
            result("Beşiktaş", 0.1),
            result("Kadıköy", 0.2),
            result("Üsküdar", 0.3),
            result("Kadıköy", 0.4),
            result("", 0.5),
        ];
        let (matched, other) = partition_by_field(results, "district", "KADIKÖY park");

        assert_eq!(
            matched.iter().map(|r| r.distance).collect::<Vec<_>>(),
            vec![0.2, 0.4]
        );
        assert_eq!(
            other.iter().map(|r| r.distance).collect::<Vec<_>>(),
            vec![0.1, 0.3, 0.5]
        );
    }

    #[test]
    fn test_partition_matches_field_containing_query() {
        let (matched, _) = partition_by_field(vec![result("Kadıköy", 0.0)], "district", "kadı");
        assert_eq!(matched.len(), 1);

        let (matched, _) = partition_by_field(vec![result("Kadıköy", 0.0)], "missing", "kadı");
        assert!(matched.is_empty());
    }

    #[test]
    fn test_rerank_promotes_domain_match_over_nearer_results() {
        let groups = groups();
        let index = built_index(&groups);
        let orchestrator =
            SearchOrchestrator::new(options(RerankPolicy::Field("district".to_string())));

        let results = orchestrator.search(&index, &groups, "Kadıköy park");

        assert_eq!(results[0].metadata.get_str("district"), Some("Kadıköy"));
        assert_eq!(results[0].rank, 1);
        // Its raw distance is not the smallest in the list
        assert!(results[1..].iter().any(|r| r.distance < results[0].distance));
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
            assert_eq!(r.similarity, 1.0 / (1.0 + r.distance));
        }
    }

    #[test]
    fn test_no_domain_match_discards_vector_results() {
        let groups = groups();
        let index = built_index(&groups);
        let orchestrator =
            SearchOrchestrator::new(options(RerankPolicy::Field("district".to_string())));

        // Close to two documents, but no district is named and no field
        // contains the query literally
        assert!(orchestrator.search(&index, &groups, "meydan park").is_empty());

        let fallback = orchestrator.search(&index, &groups, "park toplanma");
        assert_eq!(fallback.len(), 3);
        assert!(fallback.iter().all(|r| r.distance == 0.0));
    }

    #[test]
    fn test_without_rerank_results_follow_distance() {
        let groups = groups();
        let index = built_index(&groups);
        let orchestrator = SearchOrchestrator::new(SearchOptions {
            result_limit: 2,
            ..options(RerankPolicy::None)
        });

        let results = orchestrator.search(&index, &groups, "park");
        assert_eq!(results.len(), 2);
        assert!(results[0].distance <= results[1].distance);
        assert_eq!(results[0].metadata.get_str("district"), Some("Beşiktaş"));
    }

    #[test]
    fn test_unloaded_index_uses_fallback() {
        let orchestrator = SearchOrchestrator::new(options(RerankPolicy::None));
        let results = orchestrator.search(&SemanticIndex::new(), &groups(), "üsküdar");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].similarity, 1.0);
    }

    #[test]
    fn test_stale_positions_are_dropped() {
        let groups = groups();
        let mut index = built_index(&groups);
        index.truncate_metadata(1);
        let orchestrator = SearchOrchestrator::new(options(RerankPolicy::None));

        let results = orchestrator.search(&index, &groups, "park");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.get_str("district"), Some("Beşiktaş"));
    }
}
