//! Damaged snapshots must not load; queries then use fallback search.

use crate::common::{tf_settings, write_districts};
use refuge::semantic::{DOCUMENTS_FILE, INDEX_FILE, METADATA_FILE};
use refuge::{AssemblyArea, SearchService, Settings};
use std::fs;
use tempfile::TempDir;

fn built(settings: &Settings) {
    write_districts(settings);
    SearchService::<AssemblyArea>::open(settings)
        .expect("Corpus should load")
        .rebuild()
        .expect("Rebuild should succeed");
}

fn assert_fallback_answers(settings: &Settings) {
    let mut service = SearchService::<AssemblyArea>::open(settings).expect("Corpus should load");
    assert!(!service.load());
    assert!(!service.index().is_loaded());

    let results = service.search("kadıköy");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].distance, 0.0);
    assert_eq!(results[0].similarity, 1.0);
    assert_eq!(results[0].metadata.get_str("district"), Some("Kadıköy"));
}

#[test]
fn test_missing_metadata_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    built(&settings);

    fs::remove_file(settings.areas_index_dir().join(METADATA_FILE)).expect("Failed to delete");
    assert_fallback_answers(&settings);
}

#[test]
fn test_truncated_index_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    built(&settings);

    let path = settings.areas_index_dir().join(INDEX_FILE);
    let bytes = fs::read(&path).expect("Failed to read index");
    fs::write(&path, &bytes[..bytes.len() - 3]).expect("Failed to truncate index");
    assert_fallback_answers(&settings);
}

#[test]
fn test_replaced_documents_fall_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    built(&settings);

    // Same length, different content: the fingerprint no longer matches
    fs::write(
        settings.areas_index_dir().join(DOCUMENTS_FILE),
        r#"["a", "b", "c"]"#,
    )
    .expect("Failed to overwrite documents");
    assert_fallback_answers(&settings);
}

#[test]
fn test_never_built_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    write_districts(&settings);

    assert_fallback_answers(&settings);
}
