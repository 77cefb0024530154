//! Build, save and reload an assembly area index.

use crate::common::{tf_settings, write_districts};
use refuge::semantic::{DOCUMENTS_FILE, INDEX_FILE, METADATA_FILE};
use refuge::{AssemblyArea, SearchService};
use tempfile::TempDir;

#[test]
fn test_rebuild_writes_aligned_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    write_districts(&settings);

    let mut service = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    // Summary and malformed files are not districts
    assert_eq!(service.groups().len(), 3);

    let documents = service.rebuild().expect("Rebuild should succeed");
    assert_eq!(documents, 3);

    let index = service.index();
    assert_eq!(index.documents().len(), index.size());
    assert_eq!(index.metadata().len(), index.size());

    let dir = settings.areas_index_dir();
    for file in [INDEX_FILE, DOCUMENTS_FILE, METADATA_FILE] {
        assert!(dir.join(file).is_file(), "missing {file}");
    }
}

#[test]
fn test_loaded_index_answers_like_built_index() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    write_districts(&settings);

    let mut built = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    built.rebuild().expect("Rebuild should succeed");

    let mut loaded = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    assert!(loaded.load());
    assert_eq!(loaded.index().documents(), built.index().documents());
    assert_eq!(loaded.index().metadata(), built.index().metadata());

    for query in ["park", "Kadıköy park", "sahil meydan", "deprem"] {
        let expected = built.index().search(query, 20).expect("Built index search");
        let actual = loaded.index().search(query, 20).expect("Loaded index search");
        assert_eq!(
            actual.iter().collect::<Vec<_>>(),
            expected.iter().collect::<Vec<_>>(),
            "neighbors differ for '{query}'"
        );
        assert_eq!(loaded.search(query), built.search(query));
    }
}

#[test]
fn test_domain_match_ranks_first_even_when_not_nearest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    write_districts(&settings);

    let mut service = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    service.rebuild().expect("Rebuild should succeed");

    let nearest = service
        .index()
        .search("Kadıköy park", 1)
        .expect("Index search");
    let (_, nearest_position) = nearest.iter().next().expect("One neighbor");
    assert_ne!(
        service.index().metadata()[nearest_position].get_str("district"),
        Some("Kadıköy")
    );

    let results = service.search("Kadıköy park");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[0].metadata.get_str("district"), Some("Kadıköy"));
    assert_eq!(results[0].metadata.get_str("area_name"), Some("sahil"));

    // The rest keep distance order
    assert!(results[1].distance <= results[2].distance);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.rank, i + 1);
        assert_eq!(result.similarity, 1.0 / (1.0 + result.distance));
    }
}

#[test]
fn test_empty_corpus_builds_empty_index() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    std::fs::create_dir_all(&settings.areas.data_dir).expect("Failed to create areas dir");

    let mut service = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    assert_eq!(service.rebuild().expect("Empty rebuild should succeed"), 0);
    assert!(service.search("Kadıköy").is_empty());

    let mut reopened = SearchService::<AssemblyArea>::open(&settings).expect("Corpus should load");
    assert!(reopened.load());
    assert_eq!(reopened.index().size(), 0);
    assert!(reopened.search("park").is_empty());
}
