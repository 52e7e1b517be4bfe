//! # Lexical Insight Analysis Engine
//!
//! ## Overview
//! This library implements the asynchronous lexical-analysis core of a
//! language-learning platform: it resolves the CEFR level and part of speech
//! of every distinct word in a piece of learner-written text by querying
//! multiple independent remote lookup services, and aggregates the outcomes
//! into level distributions, level groupings, frequency statistics and
//! part-of-speech groupings that a client can render section by section.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `cache`: shared in-flight/resolved memoization of word lookups
//! - `sources`: uniform adapters over the remote lexical services
//! - `resolver`: most-probable sense selection across sources
//! - `task`: observable asynchronous result primitive (`AnalysisTask`)
//! - `analysis`: per-exercise analysis coordinator and result types
//! - `search_model`: interactive multi-source word search
//! - `word_store`: offline (term, language) -> CEFR level database
//! - `text`: tokenization and normalization
//! - `api`: REST endpoints consumed by the client UI
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: learner exercise text, interactive search terms
//! - **Output**: per-section analysis results observable while in flight
//! - **Guarantees**: at most one remote lookup per (term, language); one
//!   failing analysis never blocks its siblings
//!
//! ## Usage
//! ```rust,no_run
//! use lexical_insight::{config::Config, Language};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     println!("default language: {}", Language::English);
//!     println!("configured sources: {}", config.sources.dictionaries.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod session;
pub mod text;
pub mod word;
pub mod cache;
pub mod task;
pub mod sources;
pub mod resolver;
pub mod word_store;
pub mod exercise;
pub mod analysis;
pub mod search_model;
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{AnalysisError, Result};
pub use task::{AnalysisTask, TaskStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a submitted exercise analysis
pub type AnalysisId = uuid::Uuid;

/// Languages supported by the lookup services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
}

impl Language {
    /// Two-letter tag used in service URLs and store keys
    pub fn as_tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Italian => "it",
        }
    }

    /// Parse a two-letter tag as produced by `as_tag`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Language::English),
            "fr" => Some(Language::French),
            "de" => Some(Language::German),
            "es" => Some(Language::Spanish),
            "it" => Some(Language::Italian),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// CEFR proficiency band assigned to a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// Parse the level tags the services return ("A1" .. "C2", case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "A1" => Some(CefrLevel::A1),
            "A2" => Some(CefrLevel::A2),
            "B1" => Some(CefrLevel::B1),
            "B2" => Some(CefrLevel::B2),
            "C1" => Some(CefrLevel::C1),
            "C2" => Some(CefrLevel::C2),
            _ => None,
        }
    }

    /// All levels in ascending order
    pub fn all() -> [CefrLevel; 6] {
        [
            CefrLevel::A1,
            CefrLevel::A2,
            CefrLevel::B1,
            CefrLevel::B2,
            CefrLevel::C1,
            CefrLevel::C2,
        ]
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        };
        f.write_str(tag)
    }
}

/// Part-of-speech classes shared across all lookup sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Determiner,
    Numeral,
    /// Returned explicitly by some taggers for tokens they refuse to classify
    Unclassified,
}

impl PartOfSpeech {
    /// Map the tag vocabulary of the backing services onto the shared classes.
    ///
    /// Returns `None` for tags the services never defined; `Unclassified` is
    /// only produced when a source explicitly answers with an
    /// unclassified/unknown tag of its own.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "noun" | "n" | "nn" | "nns" | "nnp" => Some(PartOfSpeech::Noun),
            "verb" | "v" | "vb" | "vbd" | "vbg" | "vbn" | "vbp" | "vbz" => Some(PartOfSpeech::Verb),
            "adjective" | "adj" | "jj" | "jjr" | "jjs" => Some(PartOfSpeech::Adjective),
            "adverb" | "adv" | "rb" | "rbr" | "rbs" => Some(PartOfSpeech::Adverb),
            "pronoun" | "pron" | "prp" => Some(PartOfSpeech::Pronoun),
            "preposition" | "prep" | "in" => Some(PartOfSpeech::Preposition),
            "conjunction" | "conj" | "cc" => Some(PartOfSpeech::Conjunction),
            "interjection" | "intj" | "uh" => Some(PartOfSpeech::Interjection),
            "determiner" | "det" | "dt" => Some(PartOfSpeech::Determiner),
            "numeral" | "num" | "cd" => Some(PartOfSpeech::Numeral),
            "unclassified" | "unknown" | "x" => Some(PartOfSpeech::Unclassified),
            _ => None,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Pronoun => "pronoun",
            PartOfSpeech::Preposition => "preposition",
            PartOfSpeech::Conjunction => "conjunction",
            PartOfSpeech::Interjection => "interjection",
            PartOfSpeech::Determiner => "determiner",
            PartOfSpeech::Numeral => "numeral",
            PartOfSpeech::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// One candidate meaning/classification of a term as returned by a source.
///
/// Every adapter maps its own wire format into this shape so the rest of the
/// system stays source-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSense {
    /// The headword the sense belongs to
    pub term: String,
    /// Part of speech, when the source provides one
    pub part_of_speech: Option<PartOfSpeech>,
    /// CEFR level, when the source classifies by level
    pub level: Option<CefrLevel>,
    /// Human-readable definition or gloss
    pub definition: Option<String>,
    /// Name of the source that produced this sense
    pub source: String,
}

/// Cache identity of a word lookup: normalized term plus language.
///
/// Two lookups with equal keys must never produce two independent in-flight
/// computations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey {
    /// Normalized (trimmed, lowercased) term
    pub term: String,
    /// Lookup language
    pub language: Language,
}

impl LookupKey {
    /// Build a key, normalizing the term so that surface variants of the
    /// same word share one cache slot
    pub fn new(term: &str, language: Language) -> Self {
        Self {
            term: term.trim().to_lowercase(),
            language,
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.term)
    }
}

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub deps: Arc<analysis::AnalysisDeps>,
    pub registry: Arc<analysis::AnalysisRegistry>,
    pub word_store: Arc<word_store::WordStore>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}
