//! Configuration constants.
//!
//! This module defines the constants used throughout the application: the
//! cache freshness window, persisted key names, and provider endpoints.

use std::time::Duration;

/// Freshness window for cached lookups (24 hours).
///
/// A cache entry older than this is ignored by lookups but left on disk until
/// it is overwritten or the cache is cleared.
pub const CACHE_FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Default directory for the persisted state store.
pub const DEFAULT_CACHE_DIR: &str = ".ipeed_cache";

/// Prefix of persisted cache keys (`ip_cache_<ip>`).
pub const CACHE_KEY_PREFIX: &str = "ip_cache_";

/// Key of the last successfully resolved IP.
pub const LAST_IP_KEY: &str = "last_ip";
/// Key of the last successfully resolved record.
pub const LAST_DATA_KEY: &str = "last_data";
/// Key of the last error message, shown once.
pub const LAST_ERROR_KEY: &str = "last_error";

/// Default concurrency for the `batch` command.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default User-Agent string for provider requests.
pub const DEFAULT_USER_AGENT: &str = concat!("ipeed/", env!("CARGO_PKG_VERSION"));

// Provider endpoints
/// Base URL of the ipinfo.io API
pub const IPINFO_BASE_URL: &str = "https://ipinfo.io";
/// Base URL of the ipapi.co API
pub const IPAPI_CO_BASE_URL: &str = "https://ipapi.co";
/// Base URL of the ip-api.com API
pub const IP_API_COM_BASE_URL: &str = "https://ip-api.com";

/// Fields requested from ip-api.com.
///
/// ip-api.com only returns the listed fields, so anything the normalizer reads
/// must appear here.
pub const IP_API_COM_FIELDS: &str = "status,message,country,countryCode,region,regionName,city,lat,lon,timezone,isp,org,as,asname,zip,mobile,proxy,hosting,query";

/// Message stored when an address fails validation.
pub const INVALID_IP_MESSAGE: &str = "Invalid IP address format";
