//! The single-query binaries print exactly one JSON line on stdout.

use crate::common::{tf_settings, write_districts};
use refuge::config::CONFIG_DIR;
use refuge::{AssemblyArea, SearchService};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(binary: &str, cwd: &Path, args: &[&str]) -> Output {
    Command::new(binary)
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run binary")
}

#[test]
fn test_wrong_argument_count_prints_empty_list() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    for args in [&[][..], &["kanama", "yanık"][..]] {
        for binary in [
            env!("CARGO_BIN_EXE_area-search"),
            env!("CARGO_BIN_EXE_first-aid-search"),
        ] {
            let output = run(binary, temp_dir.path(), args);
            assert!(output.status.success());
            assert_eq!(String::from_utf8_lossy(&output.stdout), "[]\n");
        }
    }
}

#[test]
fn test_missing_data_prints_empty_list() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run(
        env!("CARGO_BIN_EXE_first-aid-search"),
        temp_dir.path(),
        &["kanama"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[]\n");
}

#[test]
fn test_area_search_answers_from_saved_index() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = tf_settings(temp_dir.path());
    write_districts(&settings);
    SearchService::<AssemblyArea>::open(&settings)
        .expect("Corpus should load")
        .rebuild()
        .expect("Rebuild should succeed");
    settings
        .save(temp_dir.path().join(CONFIG_DIR).join("settings.toml"))
        .expect("Failed to save settings");

    let output = run(
        env!("CARGO_BIN_EXE_area-search"),
        temp_dir.path(),
        &["Kadıköy park"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert_eq!(stdout.lines().count(), 1);

    let results: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    let results = results.as_array().expect("a JSON list");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["rank"], 1);
    assert_eq!(results[0]["metadata"]["district"], "Kadıköy");
    assert!(results[0]["distance"].as_f64().expect("numeric distance") > 0.0);
}
