//! The lookup protocol shared by every front end.
//!
//! A session reduces free text to an address, serves fresh cache entries,
//! resolves misses, and keeps the last-result slots current so that a later
//! invocation can show what happened.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::cache::Cache;
use crate::config::{LAST_DATA_KEY, LAST_ERROR_KEY, LAST_IP_KEY};
use crate::error_handling::{LookupError, StorageError};
use crate::models::LocationRecord;
use crate::resolver::Resolver;
use crate::storage::{self, StateStore};
use crate::validate::{extract_first_valid_ipv4, Ipv4};

/// Where a returned record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Resolved from a provider during this lookup.
    Fresh,
    /// Served from the cache; written at `cached_at`.
    Cached { cached_at: DateTime<Utc> },
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub ip: Ipv4,
    pub record: LocationRecord,
    pub source: RecordSource,
}

/// Contents of the last-result slots.
#[derive(Debug, Clone, PartialEq)]
pub enum LastResult {
    /// The last lookup failed with this message.
    Error(String),
    /// The last successful lookup.
    Record { ip: String, record: LocationRecord },
}

/// Cache-aware lookups over a resolver.
#[derive(Clone)]
pub struct LookupSession {
    resolver: Resolver,
    cache: Cache,
    store: Arc<dyn StateStore>,
}

impl LookupSession {
    /// The session persists to the cache's store.
    pub fn new(resolver: Resolver, cache: Cache) -> Self {
        let store = Arc::clone(cache.store());
        LookupSession {
            resolver,
            cache,
            store,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Looks up the first valid IPv4 address found in `text`.
    ///
    /// A fresh cache entry is returned without contacting any provider. A miss
    /// is resolved and the result is cached. Both refresh the last-result
    /// slots; any failure is stored as the last error instead.
    ///
    /// # Errors
    ///
    /// - `LookupError::NoAddressFound` if `text` holds no valid address
    /// - `LookupError::Resolution` if every provider failed
    /// - `LookupError::Storage` if the state store could not be read or written
    pub async fn lookup(&self, text: &str) -> Result<LookupOutcome, LookupError> {
        let result = self.lookup_inner(text).await;
        self.finish(result)
    }

    /// Evicts the cached entry for the address in `text` and resolves it again,
    /// starting one provider further along the rotation.
    ///
    /// # Errors
    ///
    /// Same as [`lookup`](Self::lookup).
    pub async fn try_another_provider(&self, text: &str) -> Result<LookupOutcome, LookupError> {
        let result = self.try_another_inner(text).await;
        self.finish(result)
    }

    /// Returns the last stored result.
    ///
    /// A stored error is returned once and then removed, after which the last
    /// successful record (if any) is returned again.
    pub fn last_result(&self) -> Result<Option<LastResult>, StorageError> {
        if let Some(message) = storage::load::<String>(self.store.as_ref(), LAST_ERROR_KEY)? {
            self.store.remove(LAST_ERROR_KEY)?;
            return Ok(Some(LastResult::Error(message)));
        }
        let ip = storage::load::<String>(self.store.as_ref(), LAST_IP_KEY)?;
        let record = storage::load::<LocationRecord>(self.store.as_ref(), LAST_DATA_KEY)?;
        Ok(match (ip, record) {
            (Some(ip), Some(record)) => Some(LastResult::Record { ip, record }),
            _ => None,
        })
    }

    /// Removes every cache entry and the last-result slots.
    pub fn clear_cache(&self) -> Result<(), StorageError> {
        self.cache.clear()
    }

    async fn lookup_inner(&self, text: &str) -> Result<LookupOutcome, LookupError> {
        let ip = extract(text)?;
        if let Some(entry) = self.cache.fresh_entry_at(&ip, Utc::now())? {
            let cached_at = entry.cached_at();
            return Ok(LookupOutcome {
                ip,
                record: entry.record,
                source: RecordSource::Cached { cached_at },
            });
        }
        let record = self.resolver.resolve_ipv4(&ip).await?;
        self.cache.put(&ip, &record)?;
        Ok(LookupOutcome {
            ip,
            record,
            source: RecordSource::Fresh,
        })
    }

    async fn try_another_inner(&self, text: &str) -> Result<LookupOutcome, LookupError> {
        let ip = extract(text)?;
        self.cache.evict(&ip)?;
        let record = self.resolver.resolve_with_next_provider(&ip).await?;
        self.cache.put(&ip, &record)?;
        Ok(LookupOutcome {
            ip,
            record,
            source: RecordSource::Fresh,
        })
    }

    fn finish(
        &self,
        result: Result<LookupOutcome, LookupError>,
    ) -> Result<LookupOutcome, LookupError> {
        match result {
            Ok(outcome) => {
                self.remember(&outcome)?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(store_err) =
                    storage::save(self.store.as_ref(), LAST_ERROR_KEY, &e.to_string())
                {
                    warn!("Failed to store last error: {}", store_err);
                }
                Err(e)
            }
        }
    }

    fn remember(&self, outcome: &LookupOutcome) -> Result<(), StorageError> {
        debug!("Remembering {} from {}", outcome.ip, outcome.record.provider);
        storage::save(self.store.as_ref(), LAST_IP_KEY, &outcome.ip)?;
        storage::save(self.store.as_ref(), LAST_DATA_KEY, &outcome.record)?;
        self.store.remove(LAST_ERROR_KEY)
    }
}

fn extract(text: &str) -> Result<Ipv4, LookupError> {
    let text = text.trim();
    extract_first_valid_ipv4(text).ok_or_else(|| LookupError::NoAddressFound(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderRegistry, RotationSelector};
    use crate::storage::MemoryStore;
    use chrono::TimeDelta;
    use serde_json::json;

    fn session_without_providers() -> (LookupSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(ProviderRegistry::new(vec![]));
        let resolver = Resolver::new(reqwest::Client::new(), RotationSelector::seeded(registry, 1));
        (LookupSession::new(resolver, Cache::new(store.clone())), store)
    }

    fn record(ip: &str) -> LocationRecord {
        LocationRecord {
            country_name: Some("Germany".to_string()),
            country_code: Some("DE".to_string()),
            ..LocationRecord::new(ip, "ipapi.co")
        }
    }

    #[tokio::test]
    async fn test_no_address_is_stored_as_last_error() {
        let (session, _) = session_without_providers();
        let err = session.lookup("  nothing here  ").await.expect_err("no ip");
        assert_eq!(err.to_string(), "No valid IP address found in: nothing here");

        assert_eq!(
            session.last_result().expect("last"),
            Some(LastResult::Error(
                "No valid IP address found in: nothing here".to_string()
            ))
        );
        // shown once
        assert_eq!(session.last_result().expect("last"), None);
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_is_served_and_remembered() {
        let (session, store) = session_without_providers();
        let ip: Ipv4 = "5.9.1.1".parse().expect("ip");
        let written = Utc::now() - TimeDelta::hours(2);
        session.cache().put_at(&ip, &record("5.9.1.1"), written).expect("put");
        store.set(LAST_ERROR_KEY, &json!("old failure")).expect("set");

        let outcome = session.lookup("server at 5.9.1.1:443").await.expect("cache hit");
        assert_eq!(outcome.record, record("5.9.1.1"));
        assert_eq!(
            outcome.source,
            RecordSource::Cached {
                cached_at: DateTime::from_timestamp_millis(written.timestamp_millis())
                    .expect("millis")
            }
        );

        assert_eq!(
            session.last_result().expect("last"),
            Some(LastResult::Record {
                ip: "5.9.1.1".to_string(),
                record: record("5.9.1.1"),
            })
        );
    }

    #[tokio::test]
    async fn test_stale_entry_falls_through_to_resolver() {
        let (session, _) = session_without_providers();
        let ip: Ipv4 = "5.9.1.1".parse().expect("ip");
        let written = Utc::now() - TimeDelta::hours(25);
        session.cache().put_at(&ip, &record("5.9.1.1"), written).expect("put");

        let err = session.lookup("5.9.1.1").await.expect_err("no providers");
        assert!(matches!(err, LookupError::Resolution(_)));
        assert!(matches!(
            session.last_result().expect("last"),
            Some(LastResult::Error(_))
        ));
    }

    #[tokio::test]
    async fn test_try_another_provider_evicts_entry() {
        let (session, _) = session_without_providers();
        let ip: Ipv4 = "5.9.1.1".parse().expect("ip");
        session.cache().put(&ip, &record("5.9.1.1")).expect("put");

        assert!(session.try_another_provider("5.9.1.1").await.is_err());
        assert!(session.cache().entry(&ip).expect("entry").is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_slots() {
        let (session, store) = session_without_providers();
        let ip: Ipv4 = "5.9.1.1".parse().expect("ip");
        session.cache().put(&ip, &record("5.9.1.1")).expect("put");
        session.lookup("5.9.1.1").await.expect("hit");
        assert!(!store.is_empty());

        session.clear_cache().expect("clear");
        assert!(store.is_empty());
        assert_eq!(session.last_result().expect("last"), None);
    }
}
