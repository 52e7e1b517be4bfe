//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the lexical analysis engine, providing the
//! error taxonomy shared by adapters, cache, resolver and coordinator.
//!
//! ## Input/Output Specification
//! - **Input**: failure conditions from transports, decoders, the word store
//!   and the analysis pipeline
//! - **Output**: structured, cloneable error values suitable for caching and
//!   for sharing across concurrent callers of one computation
//! - **Error Categories**: transport, decode, lookup, cache, store, exercise,
//!   configuration
//!
//! ## Key Features
//! - Adapter failures are converted at the adapter boundary and never escape
//!   as raw transport errors
//! - `WordNotFound` is a valid business outcome, distinguishable from faults
//! - Cached failures are cloneable so every waiter of a shared lookup
//!   receives the same error
//! - Recoverability and category helpers for logging and retry decisions

use crate::Language;
use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error taxonomy for the lexical analysis engine.
///
/// All variants carry owned, cloneable payloads: a failed lookup is cached
/// and handed to every concurrent caller of the same key, so the error value
/// itself must be shareable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// A remote service answered with a non-2xx status
    #[error("unsuccessful call to '{source}': HTTP {status}")]
    UnsuccessfulApiCall { source: String, status: u16 },

    /// The remote service could not be reached at all
    #[error("transport failure reaching '{source}': {details}")]
    TransportFailure { source: String, details: String },

    /// A response was received but did not parse into the expected shape
    #[error("malformed response from '{source}': {details}")]
    MalformedResponse { source: String, details: String },

    /// Every consulted source returned zero senses for the term.
    /// Expected business outcome, never logged at error level.
    #[error("no source returned a sense for '{term}' ({language})")]
    WordNotFound { term: String, language: Language },

    /// The get-or-create atomicity invariant of a cache or cell was broken.
    /// Should never occur in a correct build.
    #[error("cache integrity violation: {details}")]
    CacheIntegrityViolation { details: String },

    /// Offline word database failure
    #[error("word store error: {details}")]
    WordStore { details: String },

    /// Exercise content failed validation
    #[error("invalid exercise field '{field}': {reason}")]
    InvalidExercise { field: String, reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// I/O errors
    #[error("I/O error: {details}")]
    Io { details: String },

    /// Serialization/deserialization errors outside the adapter boundary
    #[error("serialization failed: {details}")]
    Serialization { details: String },

    /// Internal system errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// Check if the error is recoverable (a retry of the operation is
    /// meaningful)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AnalysisError::TransportFailure { .. } => true,
            AnalysisError::UnsuccessfulApiCall { status, .. } => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Whether this error is the expected "word unknown to all sources"
    /// outcome rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnalysisError::WordNotFound { .. })
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::UnsuccessfulApiCall { .. }
            | AnalysisError::TransportFailure { .. } => "transport",
            AnalysisError::MalformedResponse { .. } => "decode",
            AnalysisError::WordNotFound { .. } => "lookup",
            AnalysisError::CacheIntegrityViolation { .. } => "cache",
            AnalysisError::WordStore { .. } => "store",
            AnalysisError::InvalidExercise { .. } => "exercise",
            AnalysisError::Config { .. } => "configuration",
            AnalysisError::Io { .. }
            | AnalysisError::Serialization { .. }
            | AnalysisError::Internal { .. } => "internal",
        }
    }
}

// Conversion from common error types. These are fallbacks for plumbing code;
// adapters map transport and decode failures themselves so they can attach
// the source name.
impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io {
            details: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::TransportFailure {
            source: "http".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization {
            details: format!("JSON serialization error: {}", err),
        }
    }
}

impl From<bincode::Error> for AnalysisError {
    fn from(err: bincode::Error) -> Self {
        AnalysisError::Serialization {
            details: format!("binary serialization error: {}", err),
        }
    }
}

impl From<sled::Error> for AnalysisError {
    fn from(err: sled::Error) -> Self {
        AnalysisError::WordStore {
            details: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::Config {
            message: format!("TOML error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability_follows_transport_boundaries() {
        let transport = AnalysisError::TransportFailure {
            source: "dict".into(),
            details: "connection refused".into(),
        };
        assert!(transport.is_recoverable());

        let throttled = AnalysisError::UnsuccessfulApiCall {
            source: "dict".into(),
            status: 429,
        };
        assert!(throttled.is_recoverable());

        let client_error = AnalysisError::UnsuccessfulApiCall {
            source: "dict".into(),
            status: 404,
        };
        assert!(!client_error.is_recoverable());

        let not_found = AnalysisError::WordNotFound {
            term: "zyx".into(),
            language: crate::Language::English,
        };
        assert!(!not_found.is_recoverable());
        assert!(not_found.is_not_found());
    }

    #[test]
    fn categories_cover_the_taxonomy() {
        let malformed = AnalysisError::MalformedResponse {
            source: "tagger".into(),
            details: "missing field".into(),
        };
        assert_eq!(malformed.category(), "decode");

        let violation = AnalysisError::CacheIntegrityViolation {
            details: "duplicate in-flight entry".into(),
        };
        assert_eq!(violation.category(), "cache");
    }
}
