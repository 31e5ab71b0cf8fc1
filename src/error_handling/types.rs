//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::INVALID_IP_MESSAGE;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A provider base URL could not be parsed.
    #[error("Invalid provider URL '{url}': {reason}")]
    ProviderUrlError {
        /// The rejected URL
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Error types for the persisted state store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing a state file failed.
    #[error("State store I/O error for '{key}': {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized or deserialized.
    #[error("State store serialization error for '{key}': {source}")]
    Serialization {
        /// Key being accessed
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single provider attempt.
///
/// Every variant means "this provider failed" and triggers fallback to the next
/// provider. None of them is surfaced to the user on its own; the last one is
/// carried by [`ResolutionError::AllProvidersFailed`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The request could not be sent or returned a non-success status.
    #[error("{provider} HTTP error: {message}")]
    Transport {
        /// Provider name
        provider: String,
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Status line or transport error text
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("{provider} returned malformed data: {message}")]
    Parse {
        /// Provider name
        provider: String,
        /// Parser message
        message: String,
    },

    /// The provider answered but reported failure in its payload.
    #[error("{provider} returned invalid data: {reason}")]
    Rejected {
        /// Provider name
        provider: String,
        /// The provider's own error/message/reason text
        reason: String,
    },

    /// The payload could not be mapped into a location record.
    #[error("{provider} response could not be normalized: {message}")]
    Normalization {
        /// Provider name
        provider: String,
        /// What was missing or malformed
        message: String,
    },

    /// The provider resolved a different address than the one requested.
    #[error("{provider} returned data for different IP")]
    IdentityMismatch {
        /// Provider name
        provider: String,
        /// Address requested
        requested: String,
        /// Address the provider answered for
        returned: String,
    },
}

impl ProviderError {
    /// Name of the provider that failed.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Parse { provider, .. }
            | ProviderError::Rejected { provider, .. }
            | ProviderError::Normalization { provider, .. }
            | ProviderError::IdentityMismatch { provider, .. } => provider,
        }
    }

    /// Category of this failure for statistics.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ProviderError::Transport { .. } => ErrorType::TransportError,
            ProviderError::Parse { .. } => ErrorType::ParseError,
            ProviderError::Rejected { .. } => ErrorType::ProviderRejected,
            ProviderError::Normalization { .. } => ErrorType::NormalizationError,
            ProviderError::IdentityMismatch { .. } => ErrorType::IdentityMismatch,
        }
    }
}

/// Terminal outcome of a failed resolution.
///
/// `Clone` so that callers sharing one in-flight resolution all receive it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// The address is not a valid dotted-decimal IPv4 address. Never retried.
    #[error("{}", INVALID_IP_MESSAGE)]
    InvalidInput(String),

    /// Every provider was tried once and all of them failed.
    #[error("All API providers failed. Last error: {last}")]
    AllProvidersFailed {
        /// Number of providers attempted
        attempts: usize,
        /// The last individual failure
        last: ProviderError,
    },

    /// The registry has no providers to try.
    #[error("No lookup providers are configured")]
    NoProviders,
}

/// Errors returned by the lookup session.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The input text contains no valid IPv4 address.
    #[error("No valid IP address found in: {0}")]
    NoAddressFound(String),

    /// The address was found but could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The persisted state could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Types of provider failures tracked during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorType {
    TransportError,
    ParseError,
    ProviderRejected,
    NormalizationError,
    IdentityMismatch,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TransportError => "Transport error",
            ErrorType::ParseError => "Malformed response",
            ErrorType::ProviderRejected => "Rejected by provider",
            ErrorType::NormalizationError => "Normalization error",
            ErrorType::IdentityMismatch => "Different IP returned",
        }
    }
}
