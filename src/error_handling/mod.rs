//! Error handling and resolution statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, storage, provider attempts,
//!   resolution, and lookup sessions
//! - Categorization of transport failures
//! - Resolution statistics tracking
//!
//! Provider attempt failures are categorized into:
//! - **Transport**: the request failed or returned a non-success status
//! - **Parse**: the body was not JSON
//! - **Rejected**: the provider reported an error in its payload
//! - **Normalization**: required fields were missing
//! - **Identity mismatch**: the provider answered for another address

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{status_error, transport_error};
pub use stats::ResolutionStats;
pub use types::{
    ErrorType, InitializationError, LookupError, ProviderError, ResolutionError, StorageError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn failure(error_type: ErrorType) -> ProviderError {
        let provider = "ipinfo.io".to_string();
        match error_type {
            ErrorType::TransportError => ProviderError::Transport {
                provider,
                status: Some(500),
                message: "500 Internal Server Error".to_string(),
            },
            ErrorType::ParseError => ProviderError::Parse {
                provider,
                message: "expected value".to_string(),
            },
            ErrorType::ProviderRejected => ProviderError::Rejected {
                provider,
                reason: "Unknown error".to_string(),
            },
            ErrorType::NormalizationError => ProviderError::Normalization {
                provider,
                message: "missing ip".to_string(),
            },
            ErrorType::IdentityMismatch => ProviderError::IdentityMismatch {
                provider,
                requested: "1.1.1.1".to_string(),
                returned: "8.8.8.8".to_string(),
            },
        }
    }

    #[test]
    fn test_resolution_stats_initialization() {
        let stats = ResolutionStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        assert_eq!(stats.resolved(), 0);
        assert_eq!(stats.exhausted(), 0);
    }

    #[test]
    fn test_resolution_stats_counts_each_category() {
        let stats = ResolutionStats::new();
        for error_type in ErrorType::iter() {
            stats.record_failure(&failure(error_type));
            assert_eq!(stats.get_error_count(error_type), 1);
        }
        assert_eq!(stats.total_errors(), ErrorType::iter().count());
    }

    #[test]
    fn test_resolution_stats_success_and_fallback() {
        let stats = ResolutionStats::new();
        stats.record_success(false);
        stats.record_success(true);
        stats.record_exhausted();
        assert_eq!(stats.resolved(), 2);
        assert_eq!(stats.fallbacks(), 1);
        assert_eq!(stats.exhausted(), 1);
    }
}
