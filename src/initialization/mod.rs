//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - HTTP client
//! - File-backed lookup session (state store, cache, resolver)

mod client;
mod logger;

use std::sync::Arc;

use crate::cache::Cache;
use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::resolver::Resolver;
use crate::session::LookupSession;
use crate::storage::{FileStore, StateStore};

pub use client::init_client;
pub use logger::init_logger_with;

/// Builds a lookup session persisting to `config.cache_dir`.
///
/// The directory is created lazily on the first write.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a provider URL
/// override is invalid.
pub fn init_session(config: &Config) -> Result<LookupSession, InitializationError> {
    let store: Arc<dyn StateStore> = Arc::new(FileStore::new(config.cache_dir.clone()));
    let resolver = Resolver::from_config(config)?;
    log::debug!(
        "Session state in {} with {} providers",
        config.cache_dir.display(),
        resolver.registry().len()
    );
    Ok(LookupSession::new(resolver, Cache::new(store)))
}
