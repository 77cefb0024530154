//! First-aid text in a legacy Turkish encoding, end to end.

use crate::common::tf_settings;
use refuge::{FirstAidSection, SearchService};
use tempfile::TempDir;

const TEXT: &str = "\
İLKYARDIM NEDİR
Olay yerinde yapılan ilk müdahaledir.
Kanama nasıl durdurulur?
Yaranın üzerine temiz bir bezle bastırın.
Kanama durmazsa 112'yi arayın.
YANIK
Yanık bölge soğuk suyla soğutulur.
";

#[test]
fn test_windows_1254_file_is_indexed_and_searched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());

    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1254.encode(TEXT);
    assert!(!had_errors);
    assert!(std::str::from_utf8(&bytes).is_err());
    std::fs::write(&settings.first_aid.data_file, &bytes).expect("Failed to write text");

    let mut service =
        SearchService::<FirstAidSection>::open(&settings).expect("Text should decode");
    let titles: Vec<&str> = service
        .groups()
        .iter()
        .map(|group| group.key.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["İLKYARDIM NEDİR", "Kanama nasıl durdurulur?", "YANIK"]
    );

    assert_eq!(service.rebuild().expect("Rebuild should succeed"), 3);

    let mut reopened =
        SearchService::<FirstAidSection>::open(&settings).expect("Text should decode");
    assert!(reopened.load());

    let results = reopened.search("kanama nasıl durdurulur");
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].metadata.get_str("title"),
        Some("Kanama nasıl durdurulur?")
    );
    assert_eq!(results[0].metadata.get_str("category"), Some("bleeding_wounds"));
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn test_undecodable_file_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = tf_settings(temp_dir.path());
    settings.first_aid.encodings = vec!["utf-8".to_string()];

    std::fs::write(&settings.first_aid.data_file, [0xFF, 0xFE, 0xFD]).expect("Failed to write");
    assert!(SearchService::<FirstAidSection>::open(&settings).is_err());
}
