//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{DEFAULT_CACHE_DIR, DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Overrides for provider base URLs.
///
/// `None` keeps the provider's public endpoint. Used to point the registry at
/// a mirror or a local mock server.
#[derive(Debug, Clone, Default)]
pub struct ProviderUrls {
    /// Base URL for ipinfo.io
    pub ipinfo: Option<String>,
    /// Base URL for ipapi.co
    pub ipapi_co: Option<String>,
    /// Base URL for ip-api.com
    pub ip_api_com: Option<String>,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use ipeed::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     cache_dir: PathBuf::from("/tmp/ipeed"),
///     timeout_seconds: Some(5),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Directory holding the persisted cache and last-result state
    pub cache_dir: PathBuf,

    /// Per-request timeout in seconds (`None` leaves the transport default)
    pub timeout_seconds: Option<u64>,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum concurrent lookups in batch mode
    pub max_concurrency: usize,

    /// Seed for the fallback ordering (`None` seeds from the OS)
    pub fallback_seed: Option<u64>,

    /// Provider base URL overrides
    pub provider_urls: ProviderUrls,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout_seconds: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fallback_seed: None,
            provider_urls: ProviderUrls::default(),
        }
    }
}
