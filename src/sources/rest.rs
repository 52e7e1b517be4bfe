//! # Generic REST Lookup Adapter
//!
//! ## Purpose
//! One configurable adapter for every REST-shaped lexical service: the
//! per-service differences are an endpoint template and a response shape,
//! not a class hierarchy. A dictionary, a CEFR classifier and a POS tagger
//! are all instances of this adapter with different configuration.
//!
//! ## Input/Output Specification
//! - **Input**: endpoint template with `{language}`/`{term}` placeholders,
//!   response shape selector, bearer credential from the session context
//! - **Output**: senses mapped into the shared `WordSense` shape
//! - **Failure mapping**: unreachable service -> `TransportFailure`; non-2xx
//!   -> `UnsuccessfulApiCall`; undecodable payload -> `MalformedResponse`
//!
//! ## Key Features
//! - Zero results decode to a valid empty list, never an error
//! - Unknown part-of-speech tags are dropped rather than guessed; an
//!   explicit "unclassified" tag from the service is preserved
//! - Per-source counters for the stats endpoint

use super::{LookupCounters, LookupSource, SourceHealth, SourceStats};
use crate::config::RestSourceConfig;
use crate::errors::{AnalysisError, Result};
use crate::session::SessionContext;
use crate::{CefrLevel, Language, PartOfSpeech, WordSense};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Wire format selector for one configured service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// A bare JSON array of sense records
    SenseArray,
    /// A document with `entries`, each carrying its own `senses`
    EntryDocument,
    /// A tagger answer: `tokens` with part-of-speech tags only
    TagList,
}

/// REST adapter instantiated once per configured lexical service
pub struct RestLookupSource {
    config: RestSourceConfig,
    client: Client,
    counters: LookupCounters,
}

// Wire shapes. Field aliases absorb the small naming differences between
// the deployed services.

#[derive(Debug, Deserialize)]
struct WireSense {
    term: Option<String>,
    #[serde(alias = "pos", alias = "tag")]
    part_of_speech: Option<String>,
    #[serde(alias = "cefr", alias = "cefr_level")]
    level: Option<String>,
    #[serde(alias = "gloss")]
    definition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEntryDocument {
    #[serde(default)]
    entries: Vec<WireEntry>,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    headword: String,
    #[serde(default)]
    senses: Vec<WireEntrySense>,
}

#[derive(Debug, Deserialize)]
struct WireEntrySense {
    #[serde(alias = "pos", alias = "tag")]
    part_of_speech: Option<String>,
    #[serde(alias = "cefr", alias = "cefr_level")]
    level: Option<String>,
    #[serde(alias = "gloss")]
    definition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTagList {
    #[serde(default)]
    tokens: Vec<WireTaggedToken>,
}

#[derive(Debug, Deserialize)]
struct WireTaggedToken {
    text: String,
    tag: String,
}

impl RestLookupSource {
    /// Build the adapter and its HTTP client
    pub fn new(config: RestSourceConfig) -> Result<Self> {
        if !config.endpoint.contains("{term}") {
            return Err(AnalysisError::Config {
                message: format!(
                    "endpoint for source '{}' is missing the {{term}} placeholder",
                    config.name
                ),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("lexical-insight/0.1")
            .build()
            .map_err(|e| AnalysisError::Config {
                message: format!("failed to build HTTP client for '{}': {}", config.name, e),
            })?;

        Ok(Self {
            config,
            client,
            counters: LookupCounters::default(),
        })
    }

    /// Expand the endpoint template. Terms arrive normalized from the
    /// tokenizer (word characters, apostrophes, hyphens), so plain
    /// substitution is URL-safe here.
    fn lookup_url(&self, term: &str, language: Language) -> String {
        self.config
            .endpoint
            .replace("{language}", language.as_tag())
            .replace("{term}", term)
    }

    fn transport_failure(&self, details: impl ToString) -> AnalysisError {
        AnalysisError::TransportFailure {
            source: self.config.name.clone(),
            details: details.to_string(),
        }
    }

    fn malformed(&self, details: impl ToString) -> AnalysisError {
        AnalysisError::MalformedResponse {
            source: self.config.name.clone(),
            details: details.to_string(),
        }
    }

    fn sense_from_parts(
        &self,
        term: String,
        part_of_speech: Option<String>,
        level: Option<String>,
        definition: Option<String>,
    ) -> WordSense {
        WordSense {
            term,
            part_of_speech: part_of_speech.as_deref().and_then(PartOfSpeech::from_tag),
            level: level.as_deref().and_then(CefrLevel::from_tag),
            definition,
            source: self.config.name.clone(),
        }
    }

    /// Map the raw body into senses according to the configured shape
    fn decode(&self, body: &str, term: &str) -> Result<Vec<WordSense>> {
        match self.config.response_shape {
            ResponseShape::SenseArray => {
                let senses: Vec<WireSense> =
                    serde_json::from_str(body).map_err(|e| self.malformed(e))?;
                Ok(senses
                    .into_iter()
                    .map(|s| {
                        self.sense_from_parts(
                            s.term.unwrap_or_else(|| term.to_string()),
                            s.part_of_speech,
                            s.level,
                            s.definition,
                        )
                    })
                    .collect())
            }
            ResponseShape::EntryDocument => {
                let doc: WireEntryDocument =
                    serde_json::from_str(body).map_err(|e| self.malformed(e))?;
                let mut senses = Vec::new();
                for entry in doc.entries {
                    for sense in entry.senses {
                        senses.push(self.sense_from_parts(
                            entry.headword.clone(),
                            sense.part_of_speech,
                            sense.level,
                            sense.definition,
                        ));
                    }
                }
                Ok(senses)
            }
            ResponseShape::TagList => {
                let doc: WireTagList =
                    serde_json::from_str(body).map_err(|e| self.malformed(e))?;
                Ok(doc
                    .tokens
                    .into_iter()
                    .map(|token| {
                        self.sense_from_parts(token.text, Some(token.tag), None, None)
                    })
                    .collect())
            }
        }
    }
}

#[async_trait]
impl LookupSource for RestLookupSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn lookup(
        &self,
        term: &str,
        language: Language,
        session: &SessionContext,
    ) -> Result<Vec<WordSense>> {
        let url = self.lookup_url(term, language);
        tracing::debug!(source = %self.config.name, %term, %language, "looking up term");

        let mut request = self.client.get(&url);
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

        let body = response.text().await.map_err(|e| {
            self.counters.record_failure();
            self.transport_failure(e)
        })?;

        match self.decode(&body, term) {
            Ok(senses) => {
                self.counters.record_success(senses.is_empty());
                Ok(senses)
            }
            Err(err) => {
                self.counters.record_failure();
                Err(err)
            }
        }
    }

    async fn health_check(&self) -> SourceHealth {
        let started = Instant::now();
        let url = self.lookup_url("the", Language::English);
        let outcome = self.client.get(&url).send().await;
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

    fn stats(&self) -> SourceStats {
        self.counters.snapshot(&self.config.name)
    }
}
