//! Transport error categorization.
//!
//! Maps `reqwest` failures and non-success statuses into provider attempt
//! errors with a readable message.

use reqwest::StatusCode;

use super::types::ProviderError;

/// Builds a transport error from a non-success HTTP status.
///
/// The message is the status line (e.g. `429 Too Many Requests`).
pub fn status_error(provider: &str, status: StatusCode) -> ProviderError {
    ProviderError::Transport {
        provider: provider.to_string(),
        status: Some(status.as_u16()),
        message: status.to_string(),
    }
}

/// Builds a transport error from a `reqwest::Error`.
///
/// Timeouts and connection failures get a short prefix so the stored message
/// says what went wrong without the full error chain.
pub fn transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    if let Some(status) = error.status() {
        return status_error(provider, status);
    }

    let message = if error.is_timeout() {
        format!("request timed out ({})", error)
    } else if error.is_connect() {
        format!("connection failed ({})", error)
    } else if error.is_decode() || error.is_body() {
        format!("failed to read response body ({})", error)
    } else {
        error.to_string()
    };

    ProviderError::Transport {
        provider: provider.to_string(),
        status: None,
        message,
    }
}
