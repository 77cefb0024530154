//! Entry point shared by the single-query binaries.
//!
//! `area-search` and `first-aid-search` take exactly one argument, the query,
//! and print one line of JSON: the list of results. Any other argument count
//! prints `[]`. Nothing but that line is written to stdout and the exit
//! status is always success.

use crate::config::Settings;
use crate::logging::init_logging;
use crate::service::{CorpusProfile, SearchService};

/// Output for invocations that cannot produce results.
pub const EMPTY_RESULTS: &str = "[]";

/// Runs a query binary for corpus `R` with the process arguments.
pub fn main<R: CorpusProfile>() {
    let (settings, config_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging("warn", settings.debug);
    if let Some(e) = config_error {
        tracing::warn!("Using default settings, configuration could not be loaded: {e}");
    }

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    println!("{}", run::<R>(&args, &settings));
}

/// Answers `args[0]` against corpus `R` and returns the JSON line.
pub fn run<R: CorpusProfile>(args: &[String], settings: &Settings) -> String {
    let [query] = args else {
        tracing::warn!("Expected exactly one query argument, got {}", args.len());
        return EMPTY_RESULTS.to_string();
    };

    let mut service = SearchService::<R>::open_lenient(settings);
    if !service.load() {
        tracing::info!(
            "No usable {} index in {}, answering with fallback search",
            R::KIND,
            service.index_dir().display()
        );
    }

    let results = service.search(query);
    serde_json::to_string(&results).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize results: {e}");
        EMPTY_RESULTS.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{AssemblyArea, FirstAidSection};
    use std::path::Path;
    use tempfile::TempDir;

    fn settings(root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.index_root = root.join("index");
        settings.areas.data_dir = root.join("areas");
        settings.first_aid.data_file = root.join("ilkyardim.txt");
        settings
    }

    #[test]
    fn test_wrong_argument_count_prints_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(temp_dir.path());

        assert_eq!(run::<AssemblyArea>(&[], &settings), "[]");
        assert_eq!(
            run::<AssemblyArea>(&["a".to_string(), "b".to_string()], &settings),
            "[]"
        );
    }

    #[test]
    fn test_missing_everything_prints_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(temp_dir.path());

        assert_eq!(
            run::<FirstAidSection>(&["kanama".to_string()], &settings),
            "[]"
        );
    }

    #[test]
    fn test_fallback_output_is_json_list() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings(temp_dir.path());
        std::fs::create_dir_all(&settings.areas.data_dir).unwrap();
        std::fs::write(
            settings.areas.data_dir.join("kadikoy.json"),
            r#"{"ilce": "Kadıköy", "toplanma_alanlari": [{"ad": "Yoğurtçu Parkı"}]}"#,
        )
        .unwrap();

        let output = run::<AssemblyArea>(&["Kadıköy".to_string()], &settings);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let results = parsed.as_array().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["rank"], 1);
        assert_eq!(results[0]["distance"], 0.0);
        assert_eq!(results[0]["similarity"], 1.0);
        assert_eq!(results[0]["metadata"]["district"], "Kadıköy");
        assert!(!output.contains('\n'));
    }
}
