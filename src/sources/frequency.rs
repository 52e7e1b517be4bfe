//! # Frequency Service Adapter
//!
//! ## Purpose
//! Client for the remote frequency-analysis service, which takes a whole
//! text block and returns per-word occurrence statistics, word-family
//! grouping and corpus-band classification. Unlike the per-term lookup
//! sources, this adapter submits the entire exercise text in one call.
//!
//! ## Input/Output Specification
//! - **Input**: exercise text + language + session context
//! - **Output**: `FrequencyReport` with families and band counts
//! - **Failure mapping**: identical taxonomy to the per-term adapters

use super::{FrequencyAnalyzer, LookupCounters, SourceHealth};
use crate::config::FrequencyConfig;
use crate::errors::{AnalysisError, Result};
use crate::session::SessionContext;
use crate::Language;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Corpus frequency band of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBand {
    Top1k,
    Top5k,
    Top20k,
    Rare,
}

impl FrequencyBand {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "top1k" | "top_1k" => Some(FrequencyBand::Top1k),
            "top5k" | "top_5k" => Some(FrequencyBand::Top5k),
            "top20k" | "top_20k" => Some(FrequencyBand::Top20k),
            "rare" => Some(FrequencyBand::Rare),
            _ => None,
        }
    }
}

/// Words sharing one family stem, with their combined occurrence count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFamily {
    pub stem: String,
    pub members: Vec<String>,
    pub occurrences: usize,
}

/// Frequency/word-family statistics for one text block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyReport {
    pub total_tokens: usize,
    pub distinct_words: usize,
    pub families: Vec<WordFamily>,
    pub band_counts: BTreeMap<FrequencyBand, usize>,
}

// Wire shapes of the frequency service.

#[derive(Debug, Deserialize)]
struct WireFrequencyResponse {
    total_tokens: usize,
    #[serde(default)]
    words: Vec<WireFrequencyWord>,
}

#[derive(Debug, Deserialize)]
struct WireFrequencyWord {
    term: String,
    occurrences: usize,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    band: Option<String>,
}

/// REST client for the frequency service
pub struct RestFrequencySource {
    config: FrequencyConfig,
    client: Client,
    counters: LookupCounters,
}

impl RestFrequencySource {
    pub fn new(config: FrequencyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("lexical-insight/0.1")
            .build()
            .map_err(|e| AnalysisError::Config {
                message: format!("failed to build HTTP client for frequency service: {}", e),
            })?;

        Ok(Self {
            config,
            client,
            counters: LookupCounters::default(),
        })
    }

    fn transport_failure(&self, details: impl ToString) -> AnalysisError {
        AnalysisError::TransportFailure {
            source: self.config.name.clone(),
            details: details.to_string(),
        }
    }

    /// Fold the per-word wire records into the report shape
    fn build_report(&self, wire: WireFrequencyResponse) -> FrequencyReport {
        let distinct_words = wire.words.len();
        let mut families: BTreeMap<String, WordFamily> = BTreeMap::new();
        let mut band_counts: BTreeMap<FrequencyBand, usize> = BTreeMap::new();

        for word in wire.words {
            let stem = word.family.clone().unwrap_or_else(|| word.term.clone());
            let family = families.entry(stem.clone()).or_insert_with(|| WordFamily {
                stem,
                members: Vec::new(),
                occurrences: 0,
            });
            family.members.push(word.term.clone());
            family.occurrences += word.occurrences;

            if let Some(band) = word.band.as_deref().and_then(FrequencyBand::from_tag) {
                *band_counts.entry(band).or_insert(0) += 1;
            }
        }

        FrequencyReport {
            total_tokens: wire.total_tokens,
            distinct_words,
            families: families.into_values().collect(),
            band_counts,
        }
    }
}

#[async_trait]
impl FrequencyAnalyzer for RestFrequencySource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn analyze_text(
        &self,
        text: &str,
        language: Language,
        session: &SessionContext,
    ) -> Result<FrequencyReport> {
        tracing::debug!(source = %self.config.name, %language, chars = text.len(), "submitting text for frequency analysis");

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&json!({ "text": text, "language": language.as_tag() }));
        if session.is_authenticated() {
            request = request.bearer_auth(session.access_token());
        }

        let response = request.send().await.map_err(|e| {
            self.counters.record_failure();
            self.transport_failure(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            self.counters.record_failure();
            return Err(AnalysisError::UnsuccessfulApiCall {
                source: self.config.name.clone(),
                status: status.as_u16(),
            });
        }

        let wire: WireFrequencyResponse = match response.json().await {
            Ok(wire) => wire,
            Err(e) => {
                self.counters.record_failure();
                return Err(AnalysisError::MalformedResponse {
                    source: self.config.name.clone(),
                    details: e.to_string(),
                });
            }
        };

        self.counters.record_success(wire.words.is_empty());
        Ok(self.build_report(wire))
    }

    async fn health_check(&self) -> SourceHealth {
        let started = Instant::now();
        let outcome = self
            .client
            .post(&self.config.endpoint)
            .json(&json!({ "text": "the", "language": "en" }))
            .send()
            .await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) if response.status().is_success() => SourceHealth {
                source: self.config.name.clone(),
                healthy: true,
                checked_at: Utc::now(),
                response_time_ms,
                error: None,
            },
            Ok(response) => SourceHealth {
                source: self.config.name.clone(),
                healthy: false,
                checked_at: Utc::now(),
                response_time_ms,
                error: Some(format!("HTTP {}", response.status())),
            },
            Err(e) => SourceHealth {
                source: self.config.name.clone(),
                healthy: false,
                checked_at: Utc::now(),
                response_time_ms,
                error: Some(e.to_string()),
            },
        }
    }
}
