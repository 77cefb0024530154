//! Shared fixtures for integration tests.

use refuge::Settings;
use refuge::vector::EmbeddingStrategy;
use std::fs;
use std::path::Path;

/// Settings rooted in `root` that never download a model.
pub fn tf_settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.index_root = root.join("index");
    settings.areas.data_dir = root.join("areas");
    settings.first_aid.data_file = root.join("ilkyardim.txt");
    settings.embedding.strategies = vec![EmbeddingStrategy::TermFrequency];
    settings
}

/// Writes three districts, a summary file and a malformed file.
///
/// Only Kadıköy's document is about "sahil"; the other two are dominated by
/// "park", so a query like "Kadıköy park" is nearest to them.
pub fn write_districts(settings: &Settings) {
    let dir = &settings.areas.data_dir;
    fs::create_dir_all(dir).expect("Failed to create areas dir");

    fs::write(
        dir.join("besiktas.json"),
        r#"{"ilce": "Beşiktaş", "toplanma_alanlari": [{"ad": "park park park"}]}"#,
    )
    .expect("Failed to write district");
    fs::write(
        dir.join("kadikoy.json"),
        r#"{"ilce": "Kadıköy", "toplanma_alanlari": [{"ad": "sahil"}]}"#,
    )
    .expect("Failed to write district");
    fs::write(
        dir.join("uskudar.json"),
        r#"{"district": "Üsküdar", "areas": [{"name": "park park meydan"}]}"#,
    )
    .expect("Failed to write district");
    fs::write(dir.join("00_ozet.json"), r#"{"toplam_ilce": 3}"#).expect("Failed to write summary");
    fs::write(dir.join("broken.json"), "{ not json").expect("Failed to write broken file");
}
