//! # Exercise Analysis Coordination Module
//!
//! ## Purpose
//! Orchestrates the fixed set of independent analyses over one exercise's
//! text: CEFR-level classification (grouping plus distribution), frequency
//! and word-family statistics, and part-of-speech grouping. All analyses
//! launch concurrently as soon as the exercise text is assigned or changed,
//! each wrapped in its own `AnalysisTask`.
//!
//! ## Input/Output Specification
//! - **Input**: an `EssayExercise` and the shared analysis dependencies
//! - **Output**: three independently observable analysis tasks
//! - **Workflow**: tokenize once -> de-duplicate -> resolve through the
//!   cache -> aggregate per analysis
//!
//! ## Key Features
//! - Launching never blocks: the coordinator starts all tasks and returns
//! - A failure in one analysis never prevents the siblings from completing
//! - Replacing the text aborts the previous task generation instead of
//!   merely discarding it, so superseded lookups stop consuming workers
//! - Empty or whitespace-only text completes all analyses with empty
//!   results without issuing a single adapter call

use crate::config::{AnalysisConfig, DistributionWeighting};
use crate::errors::Result;
use crate::exercise::EssayExercise;
use crate::resolver::WordResolver;
use crate::session::SessionContext;
use crate::sources::{FrequencyAnalyzer, FrequencyReport};
use crate::task::AnalysisTask;
use crate::text::{TokenCensus, Tokenizer};
use crate::word::Word;
use crate::word_store::WordStore;
use crate::{AnalysisId, CefrLevel, Language, PartOfSpeech};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Resolved snapshot of a word as it appears in analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedWord {
    pub term: String,
    pub part_of_speech: Option<PartOfSpeech>,
    pub level: Option<CefrLevel>,
    /// Source that produced the winning sense
    pub source: String,
}

impl AnalyzedWord {
    fn snapshot(word: &Word, level: Option<CefrLevel>) -> Self {
        Self {
            term: word.term().to_string(),
            part_of_speech: word.part_of_speech(),
            level,
            source: word.sense().source.clone(),
        }
    }
}

/// CEFR-level classification of one exercise: words grouped by level plus
/// the level distribution.
///
/// Unresolved words are excluded from both the groups and the distribution;
/// the distribution's fractions sum to 1.0 over the classified words and the
/// map is empty when nothing was classified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelAnalysis {
    pub groups: BTreeMap<CefrLevel, Vec<AnalyzedWord>>,
    pub distribution: BTreeMap<CefrLevel, f64>,
    pub classified_words: usize,
    pub unresolved_terms: Vec<String>,
}

/// Part-of-speech grouping of one exercise.
///
/// Every tagged word appears in exactly one group; words without a
/// resolvable tag are listed in `untagged_terms` instead of being forced
/// into a group. An explicit "unclassified" tag from a source keeps its own
/// group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosAnalysis {
    pub groups: BTreeMap<PartOfSpeech, Vec<AnalyzedWord>>,
    pub tagged_words: usize,
    pub untagged_terms: Vec<String>,
}

/// Shared collaborators every coordinator needs
pub struct AnalysisDeps {
    pub resolver: Arc<WordResolver>,
    pub frequency: Arc<dyn FrequencyAnalyzer>,
    pub word_store: Arc<WordStore>,
    pub tokenizer: Arc<Tokenizer>,
    pub session: SessionContext,
    pub config: AnalysisConfig,
}

/// Owns the analyses of one exercise and relaunches them on every content
/// mutation
pub struct ExerciseAnalysisCoordinator {
    deps: Arc<AnalysisDeps>,
    exercise: EssayExercise,
    generation: u64,
    level_task: AnalysisTask<LevelAnalysis>,
    frequency_task: AnalysisTask<FrequencyReport>,
    pos_task: AnalysisTask<PosAnalysis>,
}

impl ExerciseAnalysisCoordinator {
    /// Create the coordinator and launch the first analysis generation
    pub fn new(deps: Arc<AnalysisDeps>, exercise: EssayExercise) -> Self {
        let (level_task, frequency_task, pos_task) = Self::launch(&deps, &exercise, 1);
        Self {
            deps,
            exercise,
            generation: 1,
            level_task,
            frequency_task,
            pos_task,
        }
    }

    pub fn exercise(&self) -> &EssayExercise {
        &self.exercise
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn level_task(&self) -> &AnalysisTask<LevelAnalysis> {
        &self.level_task
    }

    pub fn frequency_task(&self) -> &AnalysisTask<FrequencyReport> {
        &self.frequency_task
    }

    pub fn pos_task(&self) -> &AnalysisTask<PosAnalysis> {
        &self.pos_task
    }

    /// Replace the exercise text and relaunch every analysis
    pub fn update_text(&mut self, text: impl Into<String>) {
        self.exercise.set_text(text);
        self.relaunch();
    }

    /// Relaunch all analyses over the current text
    pub fn refresh(&mut self) {
        self.relaunch();
    }

    fn relaunch(&mut self) {
        // The previous generation is aborted, not awaited: its tasks stop
        // consuming workers and their handles are replaced below.
        self.level_task.abort();
        self.frequency_task.abort();
        self.pos_task.abort();

        self.generation += 1;
        let (level_task, frequency_task, pos_task) =
            Self::launch(&self.deps, &self.exercise, self.generation);
        self.level_task = level_task;
        self.frequency_task = frequency_task;
        self.pos_task = pos_task;
    }

    /// Tokenize once and start all three analyses. Returns immediately; the
    /// tasks resolve independently and in any order.
    fn launch(
        deps: &Arc<AnalysisDeps>,
        exercise: &EssayExercise,
        generation: u64,
    ) -> (
        AnalysisTask<LevelAnalysis>,
        AnalysisTask<FrequencyReport>,
        AnalysisTask<PosAnalysis>,
    ) {
        let census = deps.tokenizer.census(&exercise.text);
        tracing::info!(
            exercise = %exercise.id,
            generation,
            distinct_words = census.distinct.len(),
            occurrences = census.total_occurrences,
            "launching exercise analyses"
        );

        if census.is_empty() {
            return (
                AnalysisTask::spawn(async { Ok(LevelAnalysis::default()) }),
                AnalysisTask::spawn(async { Ok(FrequencyReport::default()) }),
                AnalysisTask::spawn(async { Ok(PosAnalysis::default()) }),
            );
        }

        let language = exercise.language;

        let level_task = AnalysisTask::spawn({
            let deps = Arc::clone(deps);
            let census = census.clone();
            async move { run_level_analysis(deps, census, language).await }
        });

        let frequency_task = AnalysisTask::spawn({
            let deps = Arc::clone(deps);
            let text = exercise.text.clone();
            async move {
                deps.frequency
                    .analyze_text(&text, language, &deps.session)
                    .await
            }
        });

        let pos_task = AnalysisTask::spawn({
            let deps = Arc::clone(deps);
            async move { run_pos_analysis(deps, census, language).await }
        });

        (level_task, frequency_task, pos_task)
    }
}

/// Resolve every distinct term through the shared cache, a bounded number
/// in flight at a time
async fn resolve_distinct(
    deps: &AnalysisDeps,
    terms: &[String],
    language: Language,
) -> Vec<(String, Result<Arc<Word>>)> {
    let limit = deps.config.max_concurrent_lookups.max(1);
    stream::iter(terms.iter().cloned().map(|term| {
        let resolver = Arc::clone(&deps.resolver);
        async move {
            let outcome = resolver.resolve_most_probable(&term, language).await;
            (term, outcome)
        }
    }))
    .buffer_unordered(limit)
    .collect()
    .await
}

/// CEFR-level classification over the distinct words of the census.
///
/// Words unknown to every source are excluded (listed as unresolved); a
/// source failure other than not-found fails the analysis as a whole.
async fn run_level_analysis(
    deps: Arc<AnalysisDeps>,
    census: TokenCensus,
    language: Language,
) -> Result<LevelAnalysis> {
    let resolutions = resolve_distinct(&deps, &census.distinct, language).await;

    let mut groups: BTreeMap<CefrLevel, Vec<AnalyzedWord>> = BTreeMap::new();
    let mut level_by_term: HashMap<String, CefrLevel> = HashMap::new();
    let mut unresolved_terms = Vec::new();

    for (term, outcome) in resolutions {
        match outcome {
            Ok(word) => match word.cefr_level(&deps.word_store).await? {
                Some(level) => {
                    groups
                        .entry(level)
                        .or_default()
                        .push(AnalyzedWord::snapshot(&word, Some(level)));
                    level_by_term.insert(term, level);
                }
                None => unresolved_terms.push(term),
            },
            Err(err) if err.is_not_found() => unresolved_terms.push(term),
            Err(err) => return Err(err),
        }
    }

    for group in groups.values_mut() {
        group.sort_by(|a, b| a.term.cmp(&b.term));
    }
    unresolved_terms.sort();

    // Distribution weighting is configurable: fractions of all word
    // occurrences by default, fractions of distinct words otherwise.
    let mut distribution: BTreeMap<CefrLevel, f64> = BTreeMap::new();
    let mut total_weight = 0.0;
    for (term, level) in &level_by_term {
        let weight = match deps.config.distribution_weighting {
            DistributionWeighting::Occurrences => {
                census.counts.get(term).copied().unwrap_or(1) as f64
            }
            DistributionWeighting::DistinctWords => 1.0,
        };
        *distribution.entry(*level).or_insert(0.0) += weight;
        total_weight += weight;
    }
    if total_weight > 0.0 {
        for fraction in distribution.values_mut() {
            *fraction /= total_weight;
        }
    }

    Ok(LevelAnalysis {
        classified_words: level_by_term.len(),
        groups,
        distribution,
        unresolved_terms,
    })
}

/// Part-of-speech grouping over the distinct words of the census
async fn run_pos_analysis(
    deps: Arc<AnalysisDeps>,
    census: TokenCensus,
    language: Language,
) -> Result<PosAnalysis> {
    let resolutions = resolve_distinct(&deps, &census.distinct, language).await;

    let mut groups: BTreeMap<PartOfSpeech, Vec<AnalyzedWord>> = BTreeMap::new();
    let mut tagged_words = 0usize;
    let mut untagged_terms = Vec::new();

    for (term, outcome) in resolutions {
        match outcome {
            Ok(word) => match word.part_of_speech() {
                Some(pos) => {
                    let level = word.level_if_resolved().flatten();
                    groups
                        .entry(pos)
                        .or_default()
                        .push(AnalyzedWord::snapshot(&word, level));
                    tagged_words += 1;
                }
                None => untagged_terms.push(term),
            },
            Err(err) if err.is_not_found() => untagged_terms.push(term),
            Err(err) => return Err(err),
        }
    }

    for group in groups.values_mut() {
        group.sort_by(|a, b| a.term.cmp(&b.term));
    }
    untagged_terms.sort();

    Ok(PosAnalysis {
        groups,
        tagged_words,
        untagged_terms,
    })
}

/// Live coordinators keyed by analysis id, held by the API layer so a
/// client can poll section states. Re-submitting an exercise replaces its
/// stale entry.
pub struct AnalysisRegistry {
    entries: dashmap::DashMap<AnalysisId, Arc<parking_lot::Mutex<ExerciseAnalysisCoordinator>>>,
}

impl AnalysisRegistry {
    pub fn new() -> Self {
        Self {
            entries: dashmap::DashMap::new(),
        }
    }

    /// Register a coordinator under its exercise id, evicting any previous
    /// coordinator for the same exercise
    pub fn insert(&self, coordinator: ExerciseAnalysisCoordinator) -> AnalysisId {
        let id = coordinator.exercise().id;
        self.entries
            .insert(id, Arc::new(parking_lot::Mutex::new(coordinator)));
        id
    }

    pub fn get(
        &self,
        id: &AnalysisId,
    ) -> Option<Arc<parking_lot::Mutex<ExerciseAnalysisCoordinator>>> {
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: &AnalysisId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AnalysisRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::WordCache;
    use crate::sources::testing::{FailingFrequency, FailingSource, StaticFrequency, StaticSource};
    use crate::sources::LookupSource;
    use crate::task::TaskStatus;

    async fn make_deps(
        sources: Vec<Arc<dyn LookupSource>>,
        frequency: Arc<dyn FrequencyAnalyzer>,
        weighting: DistributionWeighting,
    ) -> (tempfile::TempDir, Arc<AnalysisDeps>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let word_store = Arc::new(
            WordStore::open_at(dir.path().join("words.db"))
                .await
                .expect("store opens"),
        );

        let mut config = AnalysisConfig::default();
        config.distribution_weighting = weighting;

        let cache = Arc::new(WordCache::new());
        let resolver = Arc::new(WordResolver::new(
            sources,
            cache,
            SessionContext::anonymous(),
        ));
        let tokenizer = Arc::new(Tokenizer::new(&config).expect("tokenizer builds"));

        let deps = Arc::new(AnalysisDeps {
            resolver,
            frequency,
            word_store,
            tokenizer,
            session: SessionContext::anonymous(),
            config,
        });
        (dir, deps)
    }

    fn exercise(text: &str) -> EssayExercise {
        EssayExercise::new(Language::English, CefrLevel::B1, 0, 1000).with_text(text)
    }

    async fn wait_all(coordinator: &ExerciseAnalysisCoordinator) {
        coordinator.level_task().wait().await;
        coordinator.frequency_task().wait().await;
        coordinator.pos_task().wait().await;
    }

    #[tokio::test]
    async fn a_failing_frequency_service_never_blocks_the_other_analyses() {
        let dictionary = Arc::new(
            StaticSource::new("dict")
                .with_sense("cats", PartOfSpeech::Noun, CefrLevel::A1)
                .with_sense("sleep", PartOfSpeech::Verb, CefrLevel::A2),
        );
        let (_dir, deps) = make_deps(
            vec![dictionary],
            Arc::new(FailingFrequency),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cats sleep"));
        wait_all(&coordinator).await;

        assert_eq!(coordinator.level_task().status(), TaskStatus::Succeeded);
        assert_eq!(coordinator.pos_task().status(), TaskStatus::Succeeded);
        assert_eq!(coordinator.frequency_task().status(), TaskStatus::Failed);

        let err = coordinator
            .frequency_task()
            .error()
            .expect("frequency task carries its error");
        assert_eq!(err.category(), "transport");
    }

    #[tokio::test]
    async fn failing_dictionaries_do_not_block_the_frequency_analysis() {
        let (_dir, deps) = make_deps(
            vec![Arc::new(FailingSource::new("dict"))],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cats sleep"));
        wait_all(&coordinator).await;

        assert_eq!(coordinator.level_task().status(), TaskStatus::Failed);
        assert_eq!(coordinator.pos_task().status(), TaskStatus::Failed);
        assert_eq!(coordinator.frequency_task().status(), TaskStatus::Succeeded);
    }

    #[tokio::test]
    async fn repeated_words_cost_a_single_lookup_across_both_analyses() {
        let dictionary = Arc::new(StaticSource::new("dict").with_sense(
            "cat",
            PartOfSpeech::Noun,
            CefrLevel::A1,
        ));
        let (_dir, deps) = make_deps(
            vec![Arc::clone(&dictionary) as Arc<dyn LookupSource>],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cat cat cat"));
        wait_all(&coordinator).await;

        // Three occurrences, two concurrent analyses, one network call.
        assert_eq!(dictionary.calls(), 1);

        let level = coordinator
            .level_task()
            .result()
            .expect("level analysis succeeded");
        assert_eq!(level.distribution.len(), 1);
        let fraction = level.distribution[&CefrLevel::A1];
        assert!((fraction - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_text_completes_without_any_adapter_call() {
        let dictionary = Arc::new(StaticSource::new("dict"));
        let (_dir, deps) = make_deps(
            vec![Arc::clone(&dictionary) as Arc<dyn LookupSource>],
            Arc::new(FailingFrequency),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("   \n\t "));
        wait_all(&coordinator).await;

        assert_eq!(dictionary.calls(), 0);
        assert_eq!(coordinator.level_task().status(), TaskStatus::Succeeded);
        assert_eq!(coordinator.frequency_task().status(), TaskStatus::Succeeded);
        assert_eq!(coordinator.pos_task().status(), TaskStatus::Succeeded);

        let level = coordinator.level_task().result().expect("empty result");
        assert!(level.groups.is_empty());
        assert!(level.distribution.is_empty());

        let pos = coordinator.pos_task().result().expect("empty result");
        assert!(pos.groups.is_empty());
    }

    #[tokio::test]
    async fn the_distribution_sums_to_one_over_classified_words() {
        let dictionary = Arc::new(
            StaticSource::new("dict")
                .with_sense("cat", PartOfSpeech::Noun, CefrLevel::A1)
                .with_sense("dog", PartOfSpeech::Noun, CefrLevel::A1)
                .with_sense("ubiquitous", PartOfSpeech::Adjective, CefrLevel::C1)
                .with_sense("run", PartOfSpeech::Verb, CefrLevel::A2),
        );
        let (_dir, deps) = make_deps(
            vec![dictionary],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator = ExerciseAnalysisCoordinator::new(
            deps,
            exercise("cat dog ubiquitous run zyxqar"),
        );
        coordinator.level_task().wait().await;

        let level = coordinator.level_task().result().expect("level analysis");
        let sum: f64 = level.distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        // The unknown word is excluded, not a zero-level bucket.
        assert_eq!(level.unresolved_terms, vec!["zyxqar".to_string()]);
        assert_eq!(level.classified_words, 4);
    }

    #[tokio::test]
    async fn all_words_unresolved_yields_an_empty_distribution() {
        let (_dir, deps) = make_deps(
            vec![Arc::new(StaticSource::new("dict"))],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator =
            ExerciseAnalysisCoordinator::new(deps, exercise("zyxqar blorp vexquil"));
        coordinator.level_task().wait().await;

        let level = coordinator
            .level_task()
            .result()
            .expect("unknown words are excluded, not a failure");
        assert!(level.distribution.is_empty());
        assert!(level.groups.is_empty());
        assert_eq!(level.classified_words, 0);
        assert_eq!(level.unresolved_terms.len(), 3);
    }

    #[tokio::test]
    async fn distribution_weighting_is_configurable() {
        let build_sources = || {
            Arc::new(
                StaticSource::new("dict")
                    .with_sense("cat", PartOfSpeech::Noun, CefrLevel::A1)
                    .with_sense("dog", PartOfSpeech::Noun, CefrLevel::B2),
            )
        };

        // Occurrence-weighted: "cat cat dog" puts 2/3 of the mass on A1.
        let (_dir_a, deps) = make_deps(
            vec![build_sources()],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;
        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cat cat dog"));
        coordinator.level_task().wait().await;
        let level = coordinator.level_task().result().expect("level analysis");
        assert!((level.distribution[&CefrLevel::A1] - 2.0 / 3.0).abs() < 1e-9);

        // Distinct-word weighting: each word counts once.
        let (_dir_b, deps) = make_deps(
            vec![build_sources()],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::DistinctWords,
        )
        .await;
        let coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cat cat dog"));
        coordinator.level_task().wait().await;
        let level = coordinator.level_task().result().expect("level analysis");
        assert!((level.distribution[&CefrLevel::A1] - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn every_tagged_word_lands_in_exactly_one_group() {
        let dictionary = Arc::new(
            StaticSource::new("dict")
                .with_sense("cat", PartOfSpeech::Noun, CefrLevel::A1)
                .with_sense("run", PartOfSpeech::Verb, CefrLevel::A2)
                .with_sense("quickly", PartOfSpeech::Adverb, CefrLevel::B1)
                .with_sense("blue", PartOfSpeech::Adjective, CefrLevel::A1),
        );
        let (_dir, deps) = make_deps(
            vec![dictionary],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let coordinator =
            ExerciseAnalysisCoordinator::new(deps, exercise("cat run quickly blue cat"));
        coordinator.pos_task().wait().await;

        let pos = coordinator.pos_task().result().expect("pos analysis");
        let mut seen: Vec<&str> = Vec::new();
        for group in pos.groups.values() {
            for word in group {
                assert!(!seen.contains(&word.term.as_str()), "word in two groups");
                seen.push(&word.term);
            }
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(pos.tagged_words, 4);
        assert!(pos.untagged_terms.is_empty());
    }

    #[tokio::test]
    async fn updating_the_text_replaces_the_task_generation() {
        let dictionary = Arc::new(
            StaticSource::new("dict")
                .with_sense("cat", PartOfSpeech::Noun, CefrLevel::A1)
                .with_sense("ubiquitous", PartOfSpeech::Adjective, CefrLevel::C1),
        );
        let (_dir, deps) = make_deps(
            vec![dictionary],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let mut coordinator = ExerciseAnalysisCoordinator::new(deps, exercise("cat"));
        coordinator.level_task().wait().await;
        assert_eq!(coordinator.generation(), 1);

        coordinator.update_text("ubiquitous");
        assert_eq!(coordinator.generation(), 2);
        coordinator.level_task().wait().await;

        let level = coordinator.level_task().result().expect("relaunched analysis");
        assert!(level.groups.contains_key(&CefrLevel::C1));
        assert!(!level.groups.contains_key(&CefrLevel::A1));
    }

    #[tokio::test]
    async fn registry_replaces_stale_coordinators_per_exercise() {
        let dictionary = Arc::new(StaticSource::new("dict").with_sense(
            "cat",
            PartOfSpeech::Noun,
            CefrLevel::A1,
        ));
        let (_dir, deps) = make_deps(
            vec![Arc::clone(&dictionary) as Arc<dyn LookupSource>],
            Arc::new(StaticFrequency {
                report: FrequencyReport::default(),
            }),
            DistributionWeighting::Occurrences,
        )
        .await;

        let registry = AnalysisRegistry::new();
        let exercise = exercise("cat");
        let id = registry.insert(ExerciseAnalysisCoordinator::new(
            Arc::clone(&deps),
            exercise.clone(),
        ));
        assert_eq!(registry.len(), 1);

        // Re-submitting the same exercise evicts the previous coordinator.
        let same_id = registry.insert(ExerciseAnalysisCoordinator::new(deps, exercise));
        assert_eq!(id, same_id);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_some());
        assert!(registry.remove(&id));
        assert!(registry.is_empty());
    }
}
