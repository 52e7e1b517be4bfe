//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the lexical analysis engine, supporting
//! TOML files, environment-variable overrides and CLI arguments with
//! validation and type-safe access to all settings.
//!
//! ## Input/Output Specification
//! - **Input**: configuration files (TOML), environment variables, CLI
//!   arguments
//! - **Output**: validated configuration structs with defaults and overrides
//! - **Validation**: type checking, placeholder checks, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Command line arguments (highest priority)
//! 2. Environment variables (`LEXICAL_INSIGHT_*`)
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use lexical_insight::config::Config;
//!
//! # fn main() -> lexical_insight::Result<()> {
//! let config = Config::from_file("config.toml")?;
//! println!("server port: {}", config.server.port);
//! # Ok(())
//! # }
//! ```

use crate::errors::{AnalysisError, Result};
use crate::sources::rest::ResponseShape;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Remote lookup source configuration
    pub sources: SourcesConfig,
    /// Analysis behavior
    pub analysis: AnalysisConfig,
    /// Offline word store settings
    pub word_store: WordStoreConfig,
    /// Session credentials forwarded to the sources
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for browser clients
    pub enable_cors: bool,
}

/// Remote lookup source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-term lookup services, consulted in priority order
    pub dictionaries: Vec<RestSourceConfig>,
    /// Whole-text frequency service
    pub frequency: FrequencyConfig,
}

impl SourcesConfig {
    /// Enabled dictionaries sorted by ascending priority; this is the
    /// resolver's consultation order
    pub fn enabled_dictionaries(&self) -> Vec<RestSourceConfig> {
        let mut enabled: Vec<RestSourceConfig> = self
            .dictionaries
            .iter()
            .filter(|d| d.enabled)
            .cloned()
            .collect();
        enabled.sort_by_key(|d| d.priority);
        enabled
    }
}

/// One REST lookup service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSourceConfig {
    /// Source name used in logs, stats and errors
    pub name: String,
    /// Endpoint template with `{language}` and `{term}` placeholders
    pub endpoint: String,
    /// Wire format of the service's responses
    pub response_shape: ResponseShape,
    /// Whether the source participates in lookups
    pub enabled: bool,
    /// Consultation order; lower values are consulted first
    pub priority: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Frequency service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyConfig {
    /// Source name used in logs, stats and errors
    pub name: String,
    /// Analysis endpoint (POST)
    pub endpoint: String,
    /// Whether frequency analysis is offered
    pub enabled: bool,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Weighting of the CEFR level distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionWeighting {
    /// Fractions of all word occurrences (a word used three times counts
    /// three times)
    Occurrences,
    /// Fractions of distinct words (each word counts once)
    DistinctWords,
}

/// Analysis behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How the level distribution weights repeated words
    pub distribution_weighting: DistributionWeighting,
    /// Minimum characters for a token to count as a word
    pub min_token_chars: usize,
    /// Maximum accepted exercise text length in characters
    pub max_text_length: usize,
    /// Upper bound on concurrent source lookups per analysis
    pub max_concurrent_lookups: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            distribution_weighting: DistributionWeighting::Occurrences,
            min_token_chars: 1,
            max_text_length: 50_000,
            max_concurrent_lookups: (num_cpus::get() * 2).max(4),
        }
    }
}

/// Offline word store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordStoreConfig {
    /// Database directory path
    pub db_path: PathBuf,
    /// Optional JSON seed file applied on startup
    pub seed_path: Option<PathBuf>,
}

/// Session credentials for the remote services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Account identifier forwarded with lookups
    pub account_id: String,
    /// Opaque bearer credential; empty means anonymous
    pub access_token: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file, falling back to defaults if
    /// the file does not exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::Config {
            message: format!("failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| AnalysisError::Config {
            message: format!("failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("LEXICAL_INSIGHT_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("LEXICAL_INSIGHT_PORT") {
            self.server.port = port.parse().map_err(|_| AnalysisError::Config {
                message: "invalid port number in LEXICAL_INSIGHT_PORT".to_string(),
            })?;
        }
        if let Ok(db_path) = std::env::var("LEXICAL_INSIGHT_DB_PATH") {
            self.word_store.db_path = PathBuf::from(db_path);
        }
        if let Ok(account_id) = std::env::var("LEXICAL_INSIGHT_ACCOUNT_ID") {
            self.session.account_id = account_id;
        }
        if let Ok(token) = std::env::var("LEXICAL_INSIGHT_ACCESS_TOKEN") {
            self.session.access_token = token;
        }
        if let Ok(level) = std::env::var("LEXICAL_INSIGHT_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AnalysisError::Config {
                message: "server.port cannot be zero".to_string(),
            });
        }

        if self.sources.enabled_dictionaries().is_empty() {
            return Err(AnalysisError::Config {
                message: "at least one dictionary source must be enabled".to_string(),
            });
        }

        for dictionary in &self.sources.dictionaries {
            if !dictionary.endpoint.contains("{term}") {
                return Err(AnalysisError::Config {
                    message: format!(
                        "sources.dictionaries['{}'].endpoint is missing the {{term}} placeholder",
                        dictionary.name
                    ),
                });
            }
        }

        if self.analysis.max_text_length == 0 {
            return Err(AnalysisError::Config {
                message: "analysis.max_text_length must be greater than zero".to_string(),
            });
        }

        if self.analysis.max_concurrent_lookups == 0 {
            return Err(AnalysisError::Config {
                message: "analysis.max_concurrent_lookups must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AnalysisError::Config {
            message: format!("failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                enable_cors: true,
            },
            sources: SourcesConfig {
                dictionaries: vec![
                    RestSourceConfig {
                        name: "cefr-dictionary".to_string(),
                        endpoint: "https://lexis.example.com/api/v1/words/{language}/{term}"
                            .to_string(),
                        response_shape: ResponseShape::EntryDocument,
                        enabled: true,
                        priority: 1,
                        timeout_seconds: 10,
                    },
                    RestSourceConfig {
                        name: "community-dictionary".to_string(),
                        endpoint: "https://openlexicon.example.org/senses/{language}/{term}"
                            .to_string(),
                        response_shape: ResponseShape::SenseArray,
                        enabled: true,
                        priority: 2,
                        timeout_seconds: 10,
                    },
                    RestSourceConfig {
                        name: "pos-tagger".to_string(),
                        endpoint: "https://tagger.example.com/tag/{language}/{term}".to_string(),
                        response_shape: ResponseShape::TagList,
                        enabled: true,
                        priority: 3,
                        timeout_seconds: 10,
                    },
                ],
                frequency: FrequencyConfig {
                    name: "frequency-service".to_string(),
                    endpoint: "https://lexis.example.com/api/v1/frequency/analyze".to_string(),
                    enabled: true,
                    timeout_seconds: 20,
                },
            },
            analysis: AnalysisConfig::default(),
            word_store: WordStoreConfig {
                db_path: PathBuf::from("./data/word_store.db"),
                seed_path: None,
            },
            session: SessionConfig {
                account_id: "anonymous".to_string(),
                access_token: String::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_configuration_validates() {
        let config = Config::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.sources.enabled_dictionaries().len(), 3);
    }

    #[test]
    fn enabled_dictionaries_come_back_in_priority_order() {
        let mut config = Config::default();
        config.sources.dictionaries[0].priority = 9;
        config.sources.dictionaries[1].enabled = false;

        let enabled = config.sources.enabled_dictionaries();
        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0].name, "pos-tagger");
        assert_eq!(enabled[1].name, "cefr-dictionary");
    }

    #[test]
    fn configs_round_trip_through_toml() {
        let config = Config::default();
        let rendered = config.to_toml().expect("serializes");
        let parsed: Config = toml::from_str(&rendered).expect("parses back");
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(
            parsed.analysis.distribution_weighting,
            DistributionWeighting::Occurrences
        );
    }

    #[test]
    fn endpoints_without_a_term_placeholder_are_rejected() {
        let mut config = Config::default();
        config.sources.dictionaries[0].endpoint = "https://broken.example.com/".to_string();
        let err = config.validate().expect_err("placeholder missing");
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn zero_ports_are_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn weighting_parses_from_snake_case_tags() {
        let parsed: DistributionWeighting =
            serde_json::from_str("\"distinct_words\"").expect("parses");
        assert_eq!(parsed, DistributionWeighting::DistinctWords);
    }
}
