//! Search service: one corpus, its index and a result cache.
//!
//! [`SearchService`] ties together the pieces a caller needs to answer
//! queries for one corpus: the source records (for building and fallback),
//! the [`SemanticIndex`], the [`SearchOrchestrator`] and a [`ResultCache`].
//! Which files feed a corpus and how it is ranked is described by its
//! [`CorpusProfile`].

use std::path::{Path, PathBuf};

use crate::cache::ResultCache;
use crate::config::{EmbeddingConfig, Settings};
use crate::corpus::{
    AssemblyArea, CorpusKind, FirstAidSection, RecordGroup, SearchableRecord, load_area_groups,
    load_first_aid_groups,
};
use crate::error::{CorpusResult, ServiceResult};
use crate::semantic::{
    RerankPolicy, SearchOptions, SearchOrchestrator, SearchResult, SemanticIndex, prepare_corpus,
};

/// Per-corpus wiring between settings, loader and ranking policy.
pub trait CorpusProfile: SearchableRecord + Sized {
    const KIND: CorpusKind;

    /// Reads the record groups from their configured source.
    fn load_groups(settings: &Settings) -> CorpusResult<Vec<RecordGroup<Self>>>;

    /// Ranking and fallback options for this corpus.
    fn search_options(settings: &Settings) -> SearchOptions;

    /// Snapshot directory of this corpus.
    fn index_dir(settings: &Settings) -> PathBuf;
}

impl CorpusProfile for AssemblyArea {
    const KIND: CorpusKind = CorpusKind::Areas;

    fn load_groups(settings: &Settings) -> CorpusResult<Vec<RecordGroup<Self>>> {
        load_area_groups(&settings.areas)
    }

    fn search_options(settings: &Settings) -> SearchOptions {
        let rerank = match settings.areas.rerank_field.trim() {
            "" => RerankPolicy::None,
            field => RerankPolicy::Field(field.to_string()),
        };
        SearchOptions::new(&settings.search, rerank, &settings.areas.keywords)
    }

    fn index_dir(settings: &Settings) -> PathBuf {
        settings.areas_index_dir()
    }
}

impl CorpusProfile for FirstAidSection {
    const KIND: CorpusKind = CorpusKind::FirstAid;

    fn load_groups(settings: &Settings) -> CorpusResult<Vec<RecordGroup<Self>>> {
        load_first_aid_groups(&settings.first_aid)
    }

    fn search_options(settings: &Settings) -> SearchOptions {
        SearchOptions::new(
            &settings.search,
            RerankPolicy::None,
            &settings.first_aid.keywords,
        )
    }

    fn index_dir(settings: &Settings) -> PathBuf {
        settings.first_aid_index_dir()
    }
}

#[derive(Debug)]
pub struct SearchService<R> {
    groups: Vec<RecordGroup<R>>,
    index: SemanticIndex,
    orchestrator: SearchOrchestrator,
    index_dir: PathBuf,
    embedding: EmbeddingConfig,
    cache: ResultCache,
}

impl<R: SearchableRecord> SearchService<R> {
    /// A service over `groups` with nothing loaded yet.
    pub fn new(
        groups: Vec<RecordGroup<R>>,
        options: SearchOptions,
        index_dir: impl Into<PathBuf>,
        embedding: EmbeddingConfig,
    ) -> Self {
        Self {
            groups,
            index: SemanticIndex::new(),
            orchestrator: SearchOrchestrator::new(options),
            index_dir: index_dir.into(),
            embedding,
            cache: ResultCache::new(),
        }
    }

    /// Loads the snapshot from the index directory.
    pub fn load(&mut self) -> bool {
        self.cache.invalidate();
        self.index.load(&self.index_dir, &self.embedding)
    }

    /// Builds a fresh index from the records and saves it.
    ///
    /// Returns the number of indexed documents.
    pub fn rebuild(&mut self) -> ServiceResult<usize> {
        self.rebuild_with_progress(|_, _| {})
    }

    /// Like [`rebuild`](Self::rebuild), reporting `(encoded, total)` as
    /// batches complete.
    pub fn rebuild_with_progress<F>(&mut self, progress: F) -> ServiceResult<usize>
    where
        F: FnMut(usize, usize),
    {
        self.cache.invalidate();

        let prepared = prepare_corpus(&self.groups);
        let index = SemanticIndex::build_with_progress(prepared, &self.embedding, progress)?;
        index.save(&self.index_dir)?;

        self.index = index;
        Ok(self.index.size())
    }

    /// Answers a query. Never fails; see [`SearchOrchestrator::search`].
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.cache.get_or_build(query, || {
            self.orchestrator.search(&self.index, &self.groups, query)
        })
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    pub fn groups(&self) -> &[RecordGroup<R>] {
        &self.groups
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn options(&self) -> &SearchOptions {
        self.orchestrator.options()
    }
}

impl<R: CorpusProfile> SearchService<R> {
    /// A service for the configured corpus.
    ///
    /// Fails when the corpus source cannot be read.
    pub fn open(settings: &Settings) -> ServiceResult<Self> {
        let groups = R::load_groups(settings)?;
        Ok(Self::with_groups(settings, groups))
    }

    /// A service for the configured corpus that tolerates an unreadable
    /// source. Queries still use the saved index; fallback search then has
    /// no records to scan.
    pub fn open_lenient(settings: &Settings) -> Self {
        let groups = R::load_groups(settings).unwrap_or_else(|e| {
            tracing::warn!("Could not read {} corpus: {e}", R::KIND);
            Vec::new()
        });
        Self::with_groups(settings, groups)
    }

    pub fn with_groups(settings: &Settings, groups: Vec<RecordGroup<R>>) -> Self {
        Self::new(
            groups,
            R::search_options(settings),
            R::index_dir(settings),
            settings.embedding.clone(),
        )
    }
}
