//! Command-line options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{DEFAULT_CACHE_DIR, DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT};
use crate::config::types::{Config, LogFormat, LogLevel, ProviderUrls};

/// Command-line interface for the `ipeed` binary.
///
/// Every global option can also be set through its `IPEED_*` environment
/// variable (or a `.env` file).
///
/// # Examples
///
/// ```bash
/// ipeed lookup "connection from 8.8.8.8 refused"
/// ipeed lookup 8.8.8.8 --another
/// ipeed batch ips.txt --json
/// ipeed --cache-dir /tmp/ipeed last
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "ipeed",
    version,
    about = "Looks up the geolocation of IPv4 addresses across several providers."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, env = "IPEED_LOG_LEVEL", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, env = "IPEED_LOG_FORMAT", default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Directory holding the lookup cache and last result
    #[arg(long, global = true, env = "IPEED_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Per-request timeout in seconds (unset: no client timeout)
    #[arg(long, global = true, env = "IPEED_TIMEOUT_SECONDS")]
    pub timeout_seconds: Option<u64>,

    /// HTTP User-Agent header value
    #[arg(long, global = true, env = "IPEED_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum concurrent lookups in batch mode
    #[arg(long, global = true, env = "IPEED_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Seed for the fallback provider order (unset: random)
    #[arg(long, global = true, env = "IPEED_FALLBACK_SEED")]
    pub fallback_seed: Option<u64>,

    /// Base URL override for ipinfo.io
    #[arg(long, global = true, env = "IPEED_IPINFO_URL")]
    pub ipinfo_url: Option<String>,

    /// Base URL override for ipapi.co
    #[arg(long, global = true, env = "IPEED_IPAPI_CO_URL")]
    pub ipapi_co_url: Option<String>,

    /// Base URL override for ip-api.com
    #[arg(long, global = true, env = "IPEED_IP_API_COM_URL")]
    pub ip_api_com_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up the first IPv4 address found in the given text
    Lookup {
        /// Free text containing an address
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Skip the cache and start with the next provider in rotation
        #[arg(long)]
        another: bool,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up one address per line from a file, or stdin with "-"
    Batch {
        #[arg(default_value = "-")]
        file: String,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Show the last lookup result or error
    Last,

    /// Remove all cached lookups and the last result
    ClearCache,

    /// List the configured providers in rotation order
    Providers,
}

impl Cli {
    /// Library configuration from the global options.
    pub fn to_config(&self) -> Config {
        let g = &self.global;
        Config {
            log_level: g.log_level.clone(),
            log_format: g.log_format.clone(),
            cache_dir: g.cache_dir.clone(),
            timeout_seconds: g.timeout_seconds,
            user_agent: g.user_agent.clone(),
            max_concurrency: g.max_concurrency.max(1),
            fallback_seed: g.fallback_seed,
            provider_urls: ProviderUrls {
                ipinfo: g.ipinfo_url.clone(),
                ipapi_co: g.ipapi_co_url.clone(),
                ip_api_com: g.ip_api_com_url.clone(),
            },
        }
    }
}
