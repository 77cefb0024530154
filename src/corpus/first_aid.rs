//! First-aid knowledge corpus.
//!
//! The source is a plain text file of headings followed by body lines. A line
//! is a heading when it
//! - ends with `?`,
//! - ends with `nasıl` ("how"),
//! - starts with a numbered marker such as `(12)`, or
//! - is written entirely in upper case and is longer than 3 characters.
//!
//! Body lines accumulate under the current heading. A section is only emitted
//! once it has both a heading and at least one body line. Each section forms
//! its own record group keyed by its title.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::FirstAidConfig;
use crate::corpus::encoding::read_text_file;
use crate::corpus::{RecordGroup, SearchableRecord};
use crate::error::CorpusResult;
use crate::semantic::{FULL_DATA_KEY, Metadata, SemanticField};
use crate::vector::tokenize;

/// Line-number prefix left behind by some exports, e.g. `12|text`.
static LINE_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\|").expect("line prefix pattern is valid"));

static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d+\)").expect("heading pattern is valid"));

/// Terms that are tagged whenever they occur in a section.
const MEDICAL_TERMS: &[&str] = &[
    "acil",
    "yardım",
    "kanama",
    "kırık",
    "yanık",
    "bilinç",
    "solunum",
    "kalp",
    "nefes",
    "yaralanma",
    "hastane",
    "ambulans",
    "112",
    "masaj",
    "pozisyon",
    "tedavi",
    "kontrol",
    "belirti",
    "semptom",
    "müdahale",
    "uygulama",
];

/// Default number of content characters rendered into the document.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Topic of a section, derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    BasicLifeSupport,
    BleedingWounds,
    BoneMuscleInjury,
    HeatInjury,
    Consciousness,
    Poisoning,
    AnimalInjury,
    ForeignBody,
    Choking,
    Transport,
    General,
    Other,
}

/// Title keywords per category. The first category with a hit wins.
const CATEGORY_KEYWORDS: &[(SectionCategory, &[&str])] = &[
    (
        SectionCategory::BasicLifeSupport,
        &["temel yaşam", "kalp", "solunum", "yapay solunum"],
    ),
    (SectionCategory::BleedingWounds, &["kanama", "yara", "kan"]),
    (
        SectionCategory::BoneMuscleInjury,
        &["kırık", "çıkık", "burkulma"],
    ),
    (SectionCategory::HeatInjury, &["yanık", "sıcak", "donma"]),
    (SectionCategory::Consciousness, &["bilinç", "bayılma", "koma"]),
    (SectionCategory::Poisoning, &["zehir", "şofben", "karbon"]),
    (SectionCategory::AnimalInjury, &["hayvan", "ısırma", "sokma"]),
    (
        SectionCategory::ForeignBody,
        &["göz", "kulak", "burun", "yabancı cisim"],
    ),
    (SectionCategory::Choking, &["boğulma", "tıkanma"]),
    (SectionCategory::Transport, &["taşıma", "sedye"]),
    (
        SectionCategory::General,
        &["ilkyardım nedir", "tanım", "amaç"],
    ),
];

impl SectionCategory {
    /// Categorizes a section by keywords in its title.
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| title.contains(word)))
            .map(|(category, _)| *category)
            .unwrap_or(Self::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicLifeSupport => "basic_life_support",
            Self::BleedingWounds => "bleeding_wounds",
            Self::BoneMuscleInjury => "bone_muscle_injury",
            Self::HeatInjury => "heat_injury",
            Self::Consciousness => "consciousness",
            Self::Poisoning => "poisoning",
            Self::AnimalInjury => "animal_injury",
            Self::ForeignBody => "foreign_body",
            Self::Choking => "choking",
            Self::Transport => "transport",
            Self::General => "general",
            Self::Other => "other",
        }
    }
}

/// One heading with its body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstAidSection {
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub category: SectionCategory,
    /// Content length in characters
    pub length: usize,
    #[serde(skip, default = "default_preview_chars")]
    preview_chars: usize,
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

impl FirstAidSection {
    /// Builds a section, deriving category and keywords.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let content = content.into();
        Self {
            category: SectionCategory::from_title(&title),
            keywords: extract_keywords(&title, &content),
            length: content.chars().count(),
            title,
            content,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Limits how much content is rendered into the document.
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// The first `preview_chars` characters, with `...` when cut.
    pub fn content_preview(&self) -> String {
        match self.content.char_indices().nth(self.preview_chars) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }
}

impl SearchableRecord for FirstAidSection {
    fn semantic_fields(&self, _group_key: &str) -> Vec<SemanticField> {
        vec![
            SemanticField::new("Title", self.title.as_str()),
            SemanticField::new("Category", self.category.as_str()),
            SemanticField::new("Keywords", self.keywords.join(", ")),
            SemanticField::new("Content", self.content_preview()),
        ]
    }

    fn metadata(&self, _group_key: &str, position: usize) -> Metadata {
        let mut metadata = Metadata::new();
        metadata
            .insert("id", position)
            .insert("title", self.title.as_str())
            .insert("content", self.content.as_str())
            .insert_serialized("keywords", &self.keywords)
            .insert("category", self.category.as_str())
            .insert("length", self.length)
            .insert_serialized(FULL_DATA_KEY, self);
        metadata
    }

    fn literal_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.category.as_str()];
        fields.extend(self.keywords.iter().map(String::as_str));
        fields
    }
}

/// Medical terms found in the text plus title words longer than 3
/// characters, de-duplicated and sorted.
pub fn extract_keywords(title: &str, content: &str) -> Vec<String> {
    let text = format!("{title} {content}").to_lowercase();

    let mut keywords: Vec<String> = MEDICAL_TERMS
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| term.to_string())
        .collect();
    keywords.extend(
        tokenize(title)
            .into_iter()
            .filter(|word| word.chars().count() > 3),
    );

    keywords.sort();
    keywords.dedup();
    keywords
}

fn is_heading(line: &str) -> bool {
    line.ends_with('?')
        || line.ends_with("nasıl")
        || NUMBERED_HEADING.is_match(line)
        || (is_upper_case(line) && line.chars().count() > 3)
}

/// True when the line has cased letters and none of them is lower case.
fn is_upper_case(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Splits heading/body text into sections.
pub fn parse_sections(text: &str) -> Vec<FirstAidSection> {
    let mut sections = Vec::new();
    let mut title: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line = match LINE_NUMBER_PREFIX.find(line) {
            Some(prefix) => line[prefix.end()..].trim(),
            None => line,
        };
        if line.is_empty() || line.starts_with('|') {
            continue;
        }

        if is_heading(line) {
            flush_section(&mut sections, title.as_deref(), &mut body);
            title = Some(line.to_string());
        } else {
            body.push(line);
        }
    }
    flush_section(&mut sections, title.as_deref(), &mut body);

    sections
}

fn flush_section(
    sections: &mut Vec<FirstAidSection>,
    title: Option<&str>,
    body: &mut Vec<&str>,
) {
    if let Some(title) = title {
        if !body.is_empty() {
            sections.push(FirstAidSection::new(title, body.join("\n")));
        }
    }
    body.clear();
}

/// Reads and splits the configured first-aid text file.
pub fn load_first_aid_groups(
    config: &FirstAidConfig,
) -> CorpusResult<Vec<RecordGroup<FirstAidSection>>> {
    let text = read_text_file(&config.data_file, &config.encodings)?;
    let sections = parse_sections(&text);
    tracing::info!(
        "Parsed {} first-aid sections from {}",
        sections.len(),
        config.data_file.display()
    );

    Ok(sections
        .into_iter()
        .map(|section| {
            let section = section.with_preview_chars(config.content_preview_chars);
            RecordGroup::new(section.title.clone(), vec![section])
        })
        .collect())
}
