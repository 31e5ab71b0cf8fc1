//! ipeed library: IPv4 geolocation across several public providers
//!
//! Free text is reduced to one canonical IPv4 address, which is resolved by a
//! rotating primary provider with randomized fallback to the others. Results
//! are cached for 24 hours in a file-backed state store, together with the
//! last result or error of each lookup.
//!
//! # Example
//!
//! ```no_run
//! use ipeed::initialization::init_session;
//! use ipeed::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = init_session(&Config::default())?;
//! let outcome = session.lookup("request from 8.8.8.8 blocked").await?;
//! println!(
//!     "{} is in {}",
//!     outcome.ip,
//!     outcome.record.country_name.as_deref().unwrap_or("Unknown")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Resolution is async and requires a Tokio runtime.

pub mod cache;
pub mod config;
pub mod display;
pub mod error_handling;
pub mod initialization;
mod models;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod storage;
mod validate;

// Re-export public API
pub use cache::{Cache, CacheEntry};
pub use config::{Config, LogFormat, LogLevel, ProviderUrls};
pub use error_handling::{LookupError, ProviderError, ResolutionError, StorageError};
pub use models::LocationRecord;
pub use resolver::Resolver;
pub use session::{LastResult, LookupOutcome, LookupSession, RecordSource};
pub use validate::{extract_first_valid_ipv4, is_valid_ipv4, Ipv4};
