//! Embedding generation for documents and queries.
//!
//! Two strategies produce vectors:
//! - [`FastEmbedGenerator`] runs a pretrained multilingual sentence-embedding
//!   model through fastembed.
//! - [`TermFrequencyGenerator`] builds a deterministic term-frequency space
//!   over the corpus vocabulary. It needs no model files and cannot fail to
//!   initialize, which makes it the last entry of the default strategy list.
//!
//! [`select_generator`] walks an ordered strategy list and returns the first
//! generator that initializes. The chosen generator describes itself with an
//! [`EmbedderDescriptor`], which is persisted with the index so queries
//! against a loaded index are encoded exactly like the documents were.

use std::collections::HashMap;
use std::sync::LazyLock;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::vector::VectorError;

/// Word tokens: maximal runs of Unicode word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("token pattern is valid"));

/// Trait for generating embeddings from text.
///
/// Implementations must be thread-safe and produce vectors of a single,
/// fixed dimension.
pub trait EmbeddingGenerator: Send + Sync {
    /// Encode a batch of texts, one row per input, in input order.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError>;

    /// Encode a single text, typically a query.
    fn encode_one(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        self.encode(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::EmbeddingFailed("encoder returned no vector".to_string()))
    }

    /// Dimension of every vector this generator produces.
    fn dimension(&self) -> usize;

    /// Serializable description used to recreate this generator.
    fn descriptor(&self) -> EmbedderDescriptor;
}

/// Embedding strategies that can appear in `embedding.strategies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingStrategy {
    /// Pretrained sentence-embedding model
    Model,
    /// Term-frequency space fitted on the corpus
    TermFrequency,
}

impl EmbeddingStrategy {
    /// Try to build a generator for this strategy.
    ///
    /// `corpus` is only used by strategies that fit themselves on the data.
    pub fn initialize(
        self,
        config: &EmbeddingConfig,
        corpus: &[&str],
    ) -> Result<Box<dyn EmbeddingGenerator>, VectorError> {
        match self {
            Self::Model => Ok(Box::new(FastEmbedGenerator::new(config)?)),
            Self::TermFrequency => Ok(Box::new(TermFrequencyGenerator::fit(corpus))),
        }
    }
}

/// Describes the strategy an index was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum EmbedderDescriptor {
    Model { name: String },
    TermFrequency { vocabulary: Vec<String> },
}

impl EmbedderDescriptor {
    /// Recreate the generator this descriptor was taken from.
    pub fn restore(
        &self,
        config: &EmbeddingConfig,
    ) -> Result<Box<dyn EmbeddingGenerator>, VectorError> {
        match self {
            Self::Model { name } => {
                let config = EmbeddingConfig {
                    model: name.clone(),
                    ..config.clone()
                };
                Ok(Box::new(FastEmbedGenerator::new(&config)?))
            }
            Self::TermFrequency { vocabulary } => Ok(Box::new(
                TermFrequencyGenerator::from_vocabulary(vocabulary.clone()),
            )),
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Model { name } => format!("model:{name}"),
            Self::TermFrequency { vocabulary } => {
                format!("term_frequency:{} terms", vocabulary.len())
            }
        }
    }
}

/// Returns the first generator in `strategies` that initializes.
///
/// A failing strategy is logged and the next one is tried, so a missing model
/// degrades to the next strategy instead of aborting the build.
pub fn select_generator(
    strategies: &[EmbeddingStrategy],
    config: &EmbeddingConfig,
    corpus: &[&str],
) -> Result<Box<dyn EmbeddingGenerator>, VectorError> {
    let mut last_error = None;

    for strategy in strategies {
        match strategy.initialize(config, corpus) {
            Ok(generator) => {
                tracing::info!(
                    "Using embedding strategy {:?} ({} dimensions)",
                    strategy,
                    generator.dimension()
                );
                return Ok(generator);
            }
            Err(e) => {
                tracing::warn!("Embedding strategy {strategy:?} unavailable: {e}");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(VectorError::NoStrategy))
}

/// Resolve a configured model name to a fastembed model.
///
/// Accepts both the fastembed variant name and the upstream model id.
pub fn parse_embedding_model(name: &str) -> Option<EmbeddingModel> {
    let model = match name {
        "ParaphraseMLMiniLML12V2" | "paraphrase-multilingual-MiniLM-L12-v2" => {
            EmbeddingModel::ParaphraseMLMiniLML12V2
        }
        "ParaphraseMLMiniLML12V2Q" => EmbeddingModel::ParaphraseMLMiniLML12V2Q,
        "AllMiniLML6V2" | "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
        "MultilingualE5Small" | "multilingual-e5-small" => EmbeddingModel::MultilingualE5Small,
        "MultilingualE5Base" | "multilingual-e5-base" => EmbeddingModel::MultilingualE5Base,
        "BGESmallENV15" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        _ => return None,
    };
    Some(model)
}

/// fastembed-backed sentence embeddings.
///
/// Batches are encoded in a single call; fastembed parallelizes internally
/// without changing the output order.
pub struct FastEmbedGenerator {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("model", &"<TextEmbedding>")
            .finish()
    }
}

impl FastEmbedGenerator {
    /// Load the configured model, downloading it on first use.
    ///
    /// # Errors
    /// Returns [`VectorError::ModelUnavailable`] if the name is unknown or the
    /// model fails to initialize.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, VectorError> {
        let unavailable = |reason: String| VectorError::ModelUnavailable {
            model: config.model.clone(),
            reason,
        };

        let model = parse_embedding_model(&config.model)
            .ok_or_else(|| unavailable("unknown model name".to_string()))?;

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(config.model_cache_dir())
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| unavailable(e.to_string()))?;

        // Probe the output dimension with a test embedding
        let probe = text_model
            .embed(vec!["test"], None)
            .map_err(|e| unavailable(e.to_string()))?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| unavailable("model produced no probe embedding".to_string()))?;

        Ok(Self {
            model: Mutex::new(text_model),
            model_name: config.model.clone(),
            dimension,
        })
    }
}

impl EmbeddingGenerator for FastEmbedGenerator {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| {
                VectorError::EmbeddingFailed(format!("Failed to generate embeddings: {e}"))
            })?;

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(VectorError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn descriptor(&self) -> EmbedderDescriptor {
        EmbedderDescriptor::Model {
            name: self.model_name.clone(),
        }
    }
}

/// Deterministic term-frequency embeddings.
///
/// One dimension per distinct lower-cased token of the fitting corpus, in
/// first-encounter order. Each component is `count(token) / token_count(text)`.
/// The vocabulary never changes after fitting; tokens outside it contribute
/// nothing.
#[derive(Debug, Clone)]
pub struct TermFrequencyGenerator {
    vocabulary: Vec<String>,
    positions: HashMap<String, usize>,
}

impl TermFrequencyGenerator {
    /// Fit a vocabulary on the given corpus.
    pub fn fit(corpus: &[&str]) -> Self {
        let mut vocabulary = Vec::new();
        let mut positions = HashMap::new();

        for text in corpus {
            for token in tokenize(text) {
                if !positions.contains_key(&token) {
                    positions.insert(token.clone(), vocabulary.len());
                    vocabulary.push(token);
                }
            }
        }

        Self {
            vocabulary,
            positions,
        }
    }

    /// Recreate a generator from a persisted vocabulary.
    pub fn from_vocabulary(vocabulary: Vec<String>) -> Self {
        let positions = vocabulary
            .iter()
            .enumerate()
            .map(|(i, token)| (token.clone(), i))
            .collect();
        Self {
            vocabulary,
            positions,
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vector;
        }

        let total = tokens.len() as f32;
        for token in &tokens {
            if let Some(&position) = self.positions.get(token) {
                vector[position] += 1.0;
            }
        }
        for value in &mut vector {
            *value /= total;
        }
        vector
    }
}

impl EmbeddingGenerator for TermFrequencyGenerator {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        Ok(texts.par_iter().map(|text| self.vectorize(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn descriptor(&self) -> EmbedderDescriptor {
        EmbedderDescriptor::TermFrequency {
            vocabulary: self.vocabulary.clone(),
        }
    }
}

/// Lower-case a text and split it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
