//! # Word Resolver Module
//!
//! ## Purpose
//! Resolves a raw token into its most probable word sense by consulting the
//! configured lookup sources through the shared cache. All analyses and the
//! interactive word endpoint resolve words through this component, so any
//! term is looked up at most once per session regardless of how many
//! analyses need it.
//!
//! ## Input/Output Specification
//! - **Input**: term + language
//! - **Output**: the resolved `Word` behind `Arc`, shared with every other
//!   caller of the same key
//! - **Not found**: `WordNotFound` when every consulted source returned an
//!   empty sense list; the underlying lookup error only when every
//!   consultation failed outright
//!
//! ## Key Features
//! - Sources are consulted sequentially in configured priority order, which
//!   keeps the winning sense deterministic for a given configuration
//! - Every resolution goes through `WordLookupCache`, so concurrent
//!   analyses of the same exercise share one network call per distinct word

use crate::cache::WordCache;
use crate::errors::{AnalysisError, Result};
use crate::session::SessionContext;
use crate::sources::LookupSource;
use crate::word::Word;
use crate::{Language, LookupKey};
use std::sync::Arc;

/// Most-probable-sense resolution over the configured sources
pub struct WordResolver {
    sources: Vec<Arc<dyn LookupSource>>,
    cache: Arc<WordCache>,
    session: SessionContext,
}

impl WordResolver {
    pub fn new(
        sources: Vec<Arc<dyn LookupSource>>,
        cache: Arc<WordCache>,
        session: SessionContext,
    ) -> Self {
        Self {
            sources,
            cache,
            session,
        }
    }

    /// Resolve `term` to its most probable sense.
    ///
    /// The policy is deliberately naive: the first sense of the first source
    /// that returns a non-empty list wins, with no frequency or context
    /// ranking. Exercise scoring depends on this classification staying
    /// deterministic, so the source order is the configured priority order.
    pub async fn resolve_most_probable(
        &self,
        term: &str,
        language: Language,
    ) -> Result<Arc<Word>> {
        let key = LookupKey::new(term, language);
        let sources = self.sources.clone();
        let session = self.session.clone();
        let lookup_term = key.term.clone();

        self.cache
            .resolve(key, move || {
                consult_sources(sources, session, lookup_term, language)
            })
            .await
    }

    /// The shared lookup cache behind this resolver
    pub fn cache(&self) -> &Arc<WordCache> {
        &self.cache
    }

    /// The sources in consultation order
    pub fn sources(&self) -> &[Arc<dyn LookupSource>] {
        &self.sources
    }
}

/// Consult the sources in order; runs at most once per key, inside the
/// cache's shared computation.
async fn consult_sources(
    sources: Vec<Arc<dyn LookupSource>>,
    session: SessionContext,
    term: String,
    language: Language,
) -> Result<Arc<Word>> {
    let mut last_error = None;
    let mut any_source_answered = false;

    for source in &sources {
        match source.lookup(&term, language, &session).await {
            Ok(senses) => {
                any_source_answered = true;
                if let Some(first) = senses.into_iter().next() {
                    tracing::debug!(source = source.name(), %term, %language, "resolved most probable sense");
                    return Ok(Arc::new(Word::new(term, language, first)));
                }
            }
            Err(err) => {
                tracing::warn!(source = source.name(), %term, error = %err, "source consultation failed");
                last_error = Some(err);
            }
        }
    }

    // A source that answered with zero senses demotes failures from the
    // others: the term is reported unknown, not broken.
    match last_error {
        Some(err) if !any_source_answered => Err(err),
        _ => Err(AnalysisError::WordNotFound { term, language }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::{sense, FailingSource, StaticSource};
    use crate::task::{AnalysisTask, TaskStatus};
    use crate::{CefrLevel, PartOfSpeech};

    fn resolver(sources: Vec<Arc<dyn LookupSource>>) -> WordResolver {
        WordResolver::new(sources, Arc::new(WordCache::new()), SessionContext::anonymous())
    }

    #[tokio::test]
    async fn the_first_sense_of_the_first_nonempty_source_wins() {
        let primary = StaticSource::new("primary").with_senses(
            "bank",
            vec![
                sense("bank", Some(PartOfSpeech::Noun), Some(CefrLevel::B1), "primary"),
                sense("bank", Some(PartOfSpeech::Verb), Some(CefrLevel::C1), "primary"),
            ],
        );
        let secondary = StaticSource::new("secondary");

        let resolver = resolver(vec![Arc::new(primary), Arc::new(secondary)]);
        let word = resolver
            .resolve_most_probable("bank", Language::English)
            .await
            .expect("resolves");

        assert_eq!(word.part_of_speech(), Some(PartOfSpeech::Noun));
        assert_eq!(word.sense().level, Some(CefrLevel::B1));
        assert_eq!(word.sense().source, "primary");
    }

    #[tokio::test]
    async fn empty_leading_sources_fall_through_in_order() {
        let empty = StaticSource::new("empty");
        let fallback = StaticSource::new("fallback").with_sense(
            "cat",
            PartOfSpeech::Noun,
            CefrLevel::A1,
        );

        let resolver = resolver(vec![Arc::new(empty), Arc::new(fallback)]);
        let word = resolver
            .resolve_most_probable("cat", Language::English)
            .await
            .expect("resolves through fallback");

        assert_eq!(word.sense().source, "fallback");
    }

    #[tokio::test]
    async fn unknown_terms_resolve_to_word_not_found() {
        let resolver = resolver(vec![
            Arc::new(StaticSource::new("a")),
            Arc::new(StaticSource::new("b")),
        ]);

        let err = resolver
            .resolve_most_probable("zyxqar", Language::English)
            .await
            .expect_err("nothing to find");

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn a_task_wrapping_an_unknown_term_fails_rather_than_placeholding() {
        let resolver = Arc::new(resolver(vec![Arc::new(StaticSource::new("dict"))]));

        let task = AnalysisTask::spawn({
            let resolver = Arc::clone(&resolver);
            async move {
                resolver
                    .resolve_most_probable("zyxqar", Language::English)
                    .await
            }
        });

        assert_eq!(task.wait().await, TaskStatus::Failed);
        assert!(task.result().is_none());
        assert!(task.error().expect("task carries the error").is_not_found());
    }

    #[tokio::test]
    async fn all_sources_failing_surfaces_the_lookup_error() {
        let resolver = resolver(vec![
            Arc::new(FailingSource::new("a")),
            Arc::new(FailingSource::new("b")),
        ]);

        let err = resolver
            .resolve_most_probable("cat", Language::English)
            .await
            .expect_err("every consultation failed");

        assert!(matches!(err, AnalysisError::TransportFailure { .. }));
    }

    #[tokio::test]
    async fn an_empty_answer_demotes_failures_to_not_found() {
        let resolver = resolver(vec![
            Arc::new(FailingSource::new("down")),
            Arc::new(StaticSource::new("empty")),
        ]);

        let err = resolver
            .resolve_most_probable("cat", Language::English)
            .await
            .expect_err("no senses anywhere");

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn repeated_resolutions_share_one_source_call() {
        let source = Arc::new(StaticSource::new("dict").with_sense(
            "cat",
            PartOfSpeech::Noun,
            CefrLevel::A1,
        ));
        let resolver = resolver(vec![Arc::clone(&source) as Arc<dyn LookupSource>]);

        let (a, b) = tokio::join!(
            resolver.resolve_most_probable("cat", Language::English),
            resolver.resolve_most_probable("Cat", Language::English),
        );
        let third = resolver
            .resolve_most_probable("CAT", Language::English)
            .await
            .expect("cached");

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&a.expect("first"), &b.expect("second")));
        assert_eq!(third.term(), "cat");
        assert_eq!(resolver.cache().len(), 1);
    }
}
