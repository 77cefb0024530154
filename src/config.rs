//! Configuration module for the retrieval engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `REFUGE_` and use double
//! underscores to separate nested levels:
//! - `REFUGE_SEARCH__RESULT_LIMIT=10` sets `search.result_limit`
//! - `REFUGE_EMBEDDING__MODEL=AllMiniLML6V2` sets `embedding.model`
//! - `REFUGE_AREAS__DATA_DIR=/srv/areas` sets `areas.data_dir`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::vector::EmbeddingStrategy;

/// Name of the per-workspace configuration directory
pub const CONFIG_DIR: &str = ".refuge";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root directory holding one snapshot directory per corpus
    #[serde(default = "default_index_root")]
    pub index_root: PathBuf,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Embedding strategy settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Query-time ranking settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Assembly area corpus settings
    #[serde(default)]
    pub areas: AreasConfig,

    /// First-aid corpus settings
    #[serde(default)]
    pub first_aid: FirstAidConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Pretrained model used by the `model` strategy
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Strategies tried in order until one initializes
    #[serde(default = "default_strategies")]
    pub strategies: Vec<EmbeddingStrategy>,

    /// Show a progress bar while the model downloads
    #[serde(default = "default_false")]
    pub show_download_progress: bool,

    /// Directory for downloaded model files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Number of neighbors fetched from the index before re-ranking
    #[serde(default = "default_over_fetch")]
    pub over_fetch: usize,

    /// Maximum number of results returned to the caller
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AreasConfig {
    /// Directory of per-district JSON files
    #[serde(default = "default_areas_dir")]
    pub data_dir: PathBuf,

    /// File names in the data directory that are not district files
    #[serde(default = "default_skip_files")]
    pub skip_files: Vec<String>,

    /// Metadata field used for domain re-ranking
    #[serde(default = "default_rerank_field")]
    pub rerank_field: String,

    /// Query words that make every district item a fallback match
    #[serde(default = "default_area_keywords")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirstAidConfig {
    /// Heading/body text file with first-aid sections
    #[serde(default = "default_first_aid_file")]
    pub data_file: PathBuf,

    /// Candidate text encodings, tried in order
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,

    /// Query words that make every section a fallback match
    #[serde(default = "default_first_aid_keywords")]
    pub keywords: Vec<String>,

    /// Characters of section content included in the document text
    #[serde(default = "default_preview_chars")]
    pub content_preview_chars: usize,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_index_root() -> PathBuf {
    PathBuf::from(".refuge/index")
}
fn default_false() -> bool {
    false
}
fn default_embedding_model() -> String {
    "ParaphraseMLMiniLML12V2".to_string()
}
fn default_strategies() -> Vec<EmbeddingStrategy> {
    vec![EmbeddingStrategy::Model, EmbeddingStrategy::TermFrequency]
}
fn default_over_fetch() -> usize {
    20
}
fn default_result_limit() -> usize {
    5
}
fn default_areas_dir() -> PathBuf {
    PathBuf::from("new_datas")
}
fn default_skip_files() -> Vec<String> {
    vec!["00_ozet.json".to_string()]
}
fn default_rerank_field() -> String {
    "district".to_string()
}
fn default_area_keywords() -> Vec<String> {
    ["toplanma", "alan", "area", "assembly"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_first_aid_file() -> PathBuf {
    PathBuf::from("Datas/ilkyardım.txt")
}
fn default_encodings() -> Vec<String> {
    ["utf-8", "windows-1254", "iso-8859-9", "windows-1252"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_first_aid_keywords() -> Vec<String> {
    ["ilkyardım", "ilk yardım", "first aid"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_preview_chars() -> usize {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_root: default_index_root(),
            debug: false,
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            areas: AreasConfig::default(),
            first_aid: FirstAidConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            strategies: default_strategies(),
            show_download_progress: false,
            cache_dir: None,
        }
    }
}

impl EmbeddingConfig {
    /// Directory where model files are cached.
    ///
    /// Falls back to the user cache directory, then to a local directory.
    pub fn model_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join("refuge").join("models"))
                .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("models"))
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            over_fetch: default_over_fetch(),
            result_limit: default_result_limit(),
        }
    }
}

impl Default for AreasConfig {
    fn default() -> Self {
        Self {
            data_dir: default_areas_dir(),
            skip_files: default_skip_files(),
            rerank_field: default_rerank_field(),
            keywords: default_area_keywords(),
        }
    }
}

impl Default for FirstAidConfig {
    fn default() -> Self {
        Self {
            data_file: default_first_aid_file(),
            encodings: default_encodings(),
            keywords: default_first_aid_keywords(),
            content_preview_chars: default_preview_chars(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore
            // stays part of the field name
            .merge(Env::prefixed("REFUGE_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the settings file by looking for a .refuge directory from the
    /// current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }

    /// Snapshot directory for the assembly area corpus
    pub fn areas_index_dir(&self) -> PathBuf {
        self.index_root.join("areas")
    }

    /// Snapshot directory for the first-aid corpus
    pub fn first_aid_index_dir(&self) -> PathBuf {
        self.index_root.join("first_aid")
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# Refuge Configuration File

# Version of the configuration schema
version = 1

# Root directory for index snapshots (one subdirectory per corpus)
index_root = ".refuge/index"

# Global debug mode
debug = false

[embedding]
# Pretrained sentence-embedding model for the "model" strategy
model = "ParaphraseMLMiniLML12V2"

# Strategies tried in order; "term_frequency" never fails and should stay last
strategies = ["model", "term_frequency"]

# Show download progress the first time the model is fetched
show_download_progress = false

[search]
# Neighbors fetched from the index before re-ranking
over_fetch = 20

# Results returned to the caller
result_limit = 5

[areas]
# Directory of per-district JSON files
data_dir = "new_datas"

# Files in data_dir that are not district files
skip_files = ["00_ozet.json"]

# Metadata field compared against the query when re-ranking
rerank_field = "district"

# Query words that turn every item of a matching district into a fallback hit
keywords = ["toplanma", "alan", "area", "assembly"]

[first_aid]
# Heading/body text file
data_file = "Datas/ilkyardım.txt"

# Encodings tried in order when reading the text file
encodings = ["utf-8", "windows-1254", "iso-8859-9", "windows-1252"]

# Query words that make every section a fallback hit
keywords = ["ilkyardım", "ilk yardım", "first aid"]

# Characters of section content included in the indexed text
content_preview_chars = 500
"#;

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
