//! # Exercise Model Module
//!
//! ## Purpose
//! The learner exercise under analysis: the text plus its metadata
//! (language, CEFR target level, word-count bounds). The text is mutated
//! only by the client editing it or submitting; every content mutation goes
//! through the coordinator, which relaunches all dependent analyses.

use crate::errors::{AnalysisError, Result};
use crate::text::Tokenizer;
use crate::{CefrLevel, Language};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An essay exercise and its analysis-relevant metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayExercise {
    pub id: Uuid,
    pub language: Language,
    /// The proficiency band the exercise is written for
    pub target_level: CefrLevel,
    /// Inclusive word-count bounds for submission
    pub min_words: usize,
    pub max_words: usize,
    pub text: String,
}

impl EssayExercise {
    pub fn new(
        language: Language,
        target_level: CefrLevel,
        min_words: usize,
        max_words: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            target_level,
            min_words,
            max_words,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Validate the exercise for submission: sane bounds and a word count
    /// inside them. Analyses run on any text; this gate only guards
    /// submission.
    pub fn validate(&self, tokenizer: &Tokenizer) -> Result<()> {
        if self.min_words > self.max_words {
            return Err(AnalysisError::InvalidExercise {
                field: "min_words".to_string(),
                reason: format!(
                    "minimum {} exceeds maximum {}",
                    self.min_words, self.max_words
                ),
            });
        }

        let word_count = tokenizer.word_count(&self.text);
        if word_count < self.min_words {
            return Err(AnalysisError::InvalidExercise {
                field: "text".to_string(),
                reason: format!(
                    "{} words is below the minimum of {}",
                    word_count, self.min_words
                ),
            });
        }
        if word_count > self.max_words {
            return Err(AnalysisError::InvalidExercise {
                field: "text".to_string(),
                reason: format!(
                    "{} words exceeds the maximum of {}",
                    word_count, self.max_words
                ),
            });
        }

        Ok(())
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
    fn word_count_inside_the_bounds_validates() {
        let exercise = EssayExercise::new(Language::English, CefrLevel::B1, 2, 10)
            .with_text("the cat sat on the mat");
        exercise.validate(&tokenizer()).expect("valid exercise");
    }

    #[test]
    fn too_short_text_is_rejected() {
        let exercise =
            EssayExercise::new(Language::English, CefrLevel::B1, 5, 10).with_text("too short");
        let err = exercise.validate(&tokenizer()).expect_err("below minimum");
        assert!(matches!(err, AnalysisError::InvalidExercise { .. }));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let exercise = EssayExercise::new(Language::English, CefrLevel::B1, 10, 5)
            .with_text("some words here");
        let err = exercise.validate(&tokenizer()).expect_err("bad bounds");
        assert_eq!(err.category(), "exercise");
    }
}
