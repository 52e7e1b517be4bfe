//! # Lookup Sources Module
//!
//! ## Purpose
//! Defines the uniform capability every remote lexical service is wrapped
//! behind, plus the per-source health and statistics types. Concrete
//! adapters build the request, perform it through the HTTP transport, map
//! the response into the shared `WordSense` shape, and convert every
//! transport or decode failure into the engine's error taxonomy. Raw
//! transport errors never cross the adapter boundary.
//!
//! ## Input/Output Specification
//! - **Input**: term + language + session context
//! - **Output**: `Ok(Vec<WordSense>)`, where an empty list is a valid "no
//!   senses" outcome distinct from `Err(..)`
//! - **Sources**: configurable REST dictionaries/taggers (`rest`), the
//!   frequency-analysis service (`frequency`)
//!
//! ## Architecture
//! - `LookupSource` trait: common interface for per-term lookups
//! - `FrequencyAnalyzer` trait: whole-text frequency statistics
//! - `rest.rs`: generic REST adapter instantiated per service
//! - `frequency.rs`: frequency service client

pub mod frequency;
pub mod rest;

use crate::errors::Result;
use crate::session::SessionContext;
use crate::{Language, WordSense};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

pub use frequency::{FrequencyReport, RestFrequencySource, WordFamily};
pub use rest::{ResponseShape, RestLookupSource};

/// Health status of one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceHealth {
    pub source: String,
    pub healthy: bool,
    pub checked_at: DateTime<Utc>,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

/// Statistics for one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub source: String,
    pub lookups: u64,
    pub empty_results: u64,
    pub failures: u64,
    pub last_success: Option<DateTime<Utc>>,
}

/// Interior counters shared by the concrete adapters
#[derive(Default)]
pub(crate) struct LookupCounters {
    lookups: AtomicU64,
    empty_results: AtomicU64,
    failures: AtomicU64,
    last_success: parking_lot::Mutex<Option<DateTime<Utc>>>,
}

impl LookupCounters {
    pub(crate) fn record_success(&self, empty: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }
        *self.last_success.lock() = Some(Utc::now());
    }

    pub(crate) fn record_failure(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, source: &str) -> SourceStats {
        SourceStats {
            source: source.to_string(),
            lookups: self.lookups.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_success: *self.last_success.lock(),
        }
    }
}

/// Uniform per-term lookup capability over one remote lexical service
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Name of the backing service, used in logs, stats and errors
    fn name(&self) -> &str;

    /// Look up all candidate senses for `term`.
    ///
    /// Zero senses is a valid, empty result; errors mean the consultation
    /// itself failed. Implementations must keep the two distinguishable.
    async fn lookup(
        &self,
        term: &str,
        language: Language,
        session: &SessionContext,
    ) -> Result<Vec<WordSense>>;

    /// Probe the backing service
    async fn health_check(&self) -> SourceHealth;

    /// Snapshot of the source's counters
    fn stats(&self) -> SourceStats;
}

/// Whole-text frequency/word-family statistics capability
#[async_trait]
pub trait FrequencyAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Analyze a whole text block in one call
    async fn analyze_text(
        &self,
        text: &str,
        language: Language,
        session: &SessionContext,
    ) -> Result<FrequencyReport>;

    async fn health_check(&self) -> SourceHealth;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fakes used by the cache, resolver and coordinator tests.

    use super::*;
    use crate::errors::AnalysisError;
    use crate::{CefrLevel, PartOfSpeech};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    pub fn sense(
        term: &str,
        part_of_speech: Option<PartOfSpeech>,
        level: Option<CefrLevel>,
        source: &str,
    ) -> WordSense {
        WordSense {
            term: term.to_string(),
            part_of_speech,
            level,
            definition: None,
            source: source.to_string(),
        }
    }

    /// Source answering from a fixed table, counting invocations per term
    pub struct StaticSource {
        name: String,
        senses: HashMap<String, Vec<WordSense>>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                senses: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_sense(
            mut self,
            term: &str,
            part_of_speech: PartOfSpeech,
            level: CefrLevel,
        ) -> Self {
            let name = self.name.clone();
            self.senses
                .entry(term.to_string())
                .or_default()
                .push(sense(term, Some(part_of_speech), Some(level), &name));
            self
        }

        pub fn with_senses(mut self, term: &str, senses: Vec<WordSense>) -> Self {
            self.senses.insert(term.to_string(), senses);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LookupSource for StaticSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn lookup(
            &self,
            term: &str,
            _language: Language,
            _session: &SessionContext,
        ) -> Result<Vec<WordSense>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.senses.get(term).cloned().unwrap_or_default())
        }

        async fn health_check(&self) -> SourceHealth {
            SourceHealth {
                source: self.name.clone(),
                healthy: true,
                checked_at: Utc::now(),
                response_time_ms: 0,
                error: None,
            }
        }

        fn stats(&self) -> SourceStats {
            SourceStats {
                source: self.name.clone(),
                lookups: self.calls.load(Ordering::SeqCst) as u64,
                empty_results: 0,
                failures: 0,
                last_success: None,
            }
        }
    }

    /// Source whose every consultation fails with a transport error
    pub struct FailingSource {
        name: String,
        calls: AtomicUsize,
    }

    impl FailingSource {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LookupSource for FailingSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn lookup(
            &self,
            _term: &str,
            _language: Language,
            _session: &SessionContext,
        ) -> Result<Vec<WordSense>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::TransportFailure {
                source: self.name.clone(),
                details: "connection refused".to_string(),
            })
        }

        async fn health_check(&self) -> SourceHealth {
            SourceHealth {
                source: self.name.clone(),
                healthy: false,
                checked_at: Utc::now(),
                response_time_ms: 0,
                error: Some("connection refused".to_string()),
            }
        }

        fn stats(&self) -> SourceStats {
            SourceStats {
                source: self.name.clone(),
                lookups: self.calls.load(Ordering::SeqCst) as u64,
                empty_results: 0,
                failures: self.calls.load(Ordering::SeqCst) as u64,
                last_success: None,
            }
        }
    }

    /// Frequency analyzer that always fails; used for partial-failure tests
    pub struct FailingFrequency;

    #[async_trait]
    impl FrequencyAnalyzer for FailingFrequency {
        fn name(&self) -> &str {
            "frequency-fake"
        }

        async fn analyze_text(
            &self,
            _text: &str,
            _language: Language,
            _session: &SessionContext,
        ) -> Result<FrequencyReport> {
            Err(AnalysisError::UnsuccessfulApiCall {
                source: "frequency-fake".to_string(),
                status: 503,
            })
        }

        async fn health_check(&self) -> SourceHealth {
            SourceHealth {
                source: "frequency-fake".to_string(),
                healthy: false,
                checked_at: Utc::now(),
                response_time_ms: 0,
                error: Some("always failing".to_string()),
            }
        }
    }

    /// Frequency analyzer answering with a canned report
    pub struct StaticFrequency {
        pub report: FrequencyReport,
    }

    #[async_trait]
    impl FrequencyAnalyzer for StaticFrequency {
        fn name(&self) -> &str {
            "frequency-fake"
        }

        async fn analyze_text(
            &self,
            _text: &str,
            _language: Language,
            _session: &SessionContext,
        ) -> Result<FrequencyReport> {
            Ok(self.report.clone())
        }

        async fn health_check(&self) -> SourceHealth {
            SourceHealth {
                source: "frequency-fake".to_string(),
                healthy: true,
                checked_at: Utc::now(),
                response_time_ms: 0,
                error: None,
            }
        }
    }
}
