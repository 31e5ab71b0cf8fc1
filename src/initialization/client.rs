//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client shared by every provider attempt.
///
/// The client sends `config.user_agent` and applies `config.timeout_seconds`
/// as a whole-request timeout when set. Without a timeout the transport
/// default applies.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = ClientBuilder::new().user_agent(config.user_agent.clone());
    if let Some(secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}
