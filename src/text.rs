//! # Text Processing Module
//!
//! ## Purpose
//! Tokenization and normalization of learner-written exercise text. Turns a
//! raw text block into the distinct-word census the analyses operate on, so
//! that every analysis tokenizes exactly once and remote lookups are issued
//! per distinct word rather than per occurrence.
//!
//! ## Input/Output Specification
//! - **Input**: raw exercise text, interactive search input
//! - **Output**: normalized tokens with positions, distinct-word census with
//!   occurrence counts
//! - **Normalization**: Unicode NFC, case folding, whitespace cleanup
//!
//! ## Key Features
//! - Word extraction with stable first-seen ordering
//! - Occurrence counting for repetition-weighted statistics
//! - Numeric and sub-length tokens filtered out of lexical lookups

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Individual token with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Token text as it appears in the exercise
    pub text: String,
    /// Normalized form used as lookup identity
    pub normalized: String,
    /// Byte offset in the normalized text
    pub position: usize,
}

/// Distinct-word census of one text block.
///
/// `distinct` preserves first-seen order so analyses behave deterministically
/// for a given text; `counts` carries per-word occurrence totals for
/// repetition-weighted statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenCensus {
    /// Distinct normalized words in first-seen order
    pub distinct: Vec<String>,
    /// Occurrences per distinct normalized word
    pub counts: HashMap<String, usize>,
    /// Total word occurrences (sum over `counts`)
    pub total_occurrences: usize,
}

impl TokenCensus {
    pub fn is_empty(&self) -> bool {
        self.distinct.is_empty()
    }
}

/// Tokenizer shared by all analyses of the engine
pub struct Tokenizer {
    word_regex: Regex,
    min_token_chars: usize,
}

impl Tokenizer {
    /// Build a tokenizer from the analysis configuration
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let word_regex = Regex::new(r"[\p{Alphabetic}][\p{Alphabetic}'\-]*").map_err(|e| {
            AnalysisError::Internal {
                message: format!("invalid word regex: {}", e),
            }
        })?;

        Ok(Self {
            word_regex,
            min_token_chars: config.min_token_chars,
        })
    }

    /// Normalize a text block: NFC, straightened quotes, collapsed whitespace
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized: String = text.nfc().collect();

        normalized = normalized
            .replace('\u{2018}', "'")
            .replace('\u{2019}', "'");

        // Collapse runs of whitespace; control characters are dropped.
        let mut out = String::with_capacity(normalized.len());
        let mut last_was_space = false;
        for ch in normalized.chars() {
            if ch.is_whitespace() {
                if !last_was_space && !out.is_empty() {
                    out.push(' ');
                }
                last_was_space = true;
            } else if !ch.is_control() {
                out.push(ch);
                last_was_space = false;
            }
        }

        out.trim_end().to_string()
    }

    /// Extract word tokens from a text block
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        let normalized_text = self.normalize(text);
        let mut tokens = Vec::new();

        for mat in self.word_regex.find_iter(&normalized_text) {
            let word = mat.as_str().trim_matches(|c| c == '\'' || c == '-');
            if word.chars().count() < self.min_token_chars {
                continue;
            }

            tokens.push(Token {
                text: word.to_string(),
                normalized: word.to_lowercase(),
                position: mat.start(),
            });
        }

        tokens
    }

    /// Tokenize once and fold into the distinct-word census the analyses
    /// share
    pub fn census(&self, text: &str) -> TokenCensus {
        let tokens = self.tokens(text);
        let mut census = TokenCensus::default();

        for token in tokens {
            let count = census.counts.entry(token.normalized.clone()).or_insert(0);
            if *count == 0 {
                census.distinct.push(token.normalized);
            }
            *count += 1;
            census.total_occurrences += 1;
        }

        census
    }

    /// Word count used for exercise min/max validation
    pub fn word_count(&self, text: &str) -> usize {
        self.tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(&AnalysisConfig::default()).expect("tokenizer builds")
    }

    #[test]
    fn census_deduplicates_and_counts_occurrences() {
        let census = tokenizer().census("Cat cat CAT sat");
        assert_eq!(census.distinct, vec!["cat".to_string(), "sat".to_string()]);
        assert_eq!(census.counts["cat"], 3);
        assert_eq!(census.counts["sat"], 1);
        assert_eq!(census.total_occurrences, 4);
    }

    #[test]
    fn whitespace_only_text_yields_an_empty_census() {
        let census = tokenizer().census("   \n\t  ");
        assert!(census.is_empty());
        assert_eq!(census.total_occurrences, 0);
    }

    #[test]
    fn numbers_and_punctuation_are_not_words() {
        let census = tokenizer().census("in 2024, the learner wrote 3 essays!");
        assert!(census.counts.contains_key("learner"));
        assert!(!census.counts.contains_key("2024"));
        assert!(!census.counts.contains_key("3"));
    }

    #[test]
    fn apostrophes_stay_inside_words() {
        let tokens = tokenizer().tokens("it doesn't matter");
        let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
        assert_eq!(normalized, vec!["it", "doesn't", "matter"]);
    }

    #[test]
    fn normalization_collapses_whitespace() {
        let normalized = tokenizer().normalize("a  b\n\nc\t d");
        assert_eq!(normalized, "a b c d");
    }
}
