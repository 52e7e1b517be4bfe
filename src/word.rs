//! # Word Model Module
//!
//! ## Purpose
//! The resolved word type shared by all analyses: a term, the winning sense
//! picked by the resolver, and a lazily-resolved CEFR level. The level is not
//! eagerly computed; it is resolved on first access against the offline word
//! store and memoized per word instance.
//!
//! ## Key Features
//! - Explicit once-computed level cell (Uninitialized / InProgress / Done)
//!   guarded with the same get-or-create atomicity discipline as the lookup
//!   cache
//! - Remote classification wins over the offline store when the winning
//!   sense already carries a level
//! - Concurrent first accesses run the backing computation exactly once

use crate::errors::{AnalysisError, Result};
use crate::word_store::WordStore;
use crate::{CefrLevel, Language, PartOfSpeech, WordSense};
use parking_lot::Mutex;
use std::future::Future;
use tokio::sync::Notify;

/// State of the lazily-resolved level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelState {
    Uninitialized,
    InProgress,
    Done(Option<CefrLevel>),
}

/// Single-shot asynchronous cell for a word's CEFR level.
///
/// `Done(None)` records that the lookup ran and found no classification, so
/// the store is not consulted again for this instance.
pub struct LevelCell {
    state: Mutex<LevelState>,
    changed: Notify,
}

impl LevelCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LevelState::Uninitialized),
            changed: Notify::new(),
        }
    }

    /// Return the memoized level, running `resolve` exactly once across all
    /// concurrent callers. A failed resolution resets the cell so a later
    /// access can retry.
    pub async fn get_or_resolve<F, Fut>(&self, resolve: F) -> Result<Option<CefrLevel>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<CefrLevel>>>,
    {
        loop {
            // Register for the change notification before inspecting state,
            // otherwise a completion between unlock and await is lost.
            let notified = self.changed.notified();
            {
                let mut state = self.state.lock();
                match *state {
                    LevelState::Done(level) => return Ok(level),
                    LevelState::Uninitialized => {
                        *state = LevelState::InProgress;
                        break;
                    }
                    LevelState::InProgress => {}
                }
            }
            notified.await;
        }

        // This caller won the race and owns the computation.
        let outcome = resolve().await;
        let mut state = self.state.lock();
        if *state != LevelState::InProgress {
            return Err(AnalysisError::CacheIntegrityViolation {
                details: "level cell left InProgress state without its owner".to_string(),
            });
        }
        match outcome {
            Ok(level) => {
                *state = LevelState::Done(level);
                drop(state);
                self.changed.notify_waiters();
                Ok(level)
            }
            Err(err) => {
                *state = LevelState::Uninitialized;
                drop(state);
                self.changed.notify_waiters();
                Err(err)
            }
        }
    }

    /// Non-blocking snapshot; `Some` only once the cell is resolved
    pub fn peek(&self) -> Option<Option<CefrLevel>> {
        match *self.state.lock() {
            LevelState::Done(level) => Some(level),
            _ => None,
        }
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::new()
    }
}

/// A word resolved from the lookup sources.
///
/// Created per analysis run and shared behind `Arc`; the level cell is the
/// only interior state and is written at most once.
pub struct Word {
    term: String,
    language: Language,
    sense: WordSense,
    level_cell: LevelCell,
}

impl Word {
    /// Wrap the winning sense for `term`
    pub fn new(term: impl Into<String>, language: Language, sense: WordSense) -> Self {
        Self {
            term: term.into(),
            language,
            sense,
            level_cell: LevelCell::new(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The sense selected as most probable by the resolver
    pub fn sense(&self) -> &WordSense {
        &self.sense
    }

    pub fn part_of_speech(&self) -> Option<PartOfSpeech> {
        self.sense.part_of_speech
    }

    /// Resolve the CEFR level, memoized per instance.
    ///
    /// A level carried by the remote sense wins; otherwise the offline word
    /// store is consulted. `Ok(None)` means the word is unclassified
    /// everywhere, which the analyses treat as "excluded", not as a level.
    pub async fn cefr_level(&self, store: &WordStore) -> Result<Option<CefrLevel>> {
        let remote_level = self.sense.level;
        self.level_cell
            .get_or_resolve(|| async move {
                if let Some(level) = remote_level {
                    return Ok(Some(level));
                }
                store.level_for(&self.term, self.language).await
            })
            .await
    }

    /// Non-blocking view of the level, if it has been resolved already
    pub fn level_if_resolved(&self) -> Option<Option<CefrLevel>> {
        self.level_cell.peek()
    }
}

impl std::fmt::Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Word")
            .field("term", &self.term)
            .field("language", &self.language)
            .field("part_of_speech", &self.sense.part_of_speech)
            .field("level", &self.level_cell.peek())
            .finish()
    }
}
