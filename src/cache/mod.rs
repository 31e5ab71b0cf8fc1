//! Lookup cache with a fixed freshness window.
//!
//! Entries are stored in the shared [`StateStore`] under `ip_cache_<ip>` as
//! `{record, timestamp}` with the timestamp in epoch milliseconds. A stale
//! entry is ignored by lookups but stays in the store until it is overwritten,
//! evicted, or the cache is cleared.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CACHE_FRESHNESS_WINDOW, CACHE_KEY_PREFIX};
use crate::error_handling::StorageError;
use crate::models::LocationRecord;
use crate::storage::{self, StateStore};
use crate::validate::Ipv4;

/// A cached record and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(alias = "data")]
    pub record: LocationRecord,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl CacheEntry {
    /// When the entry was written.
    pub fn cached_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Age of the entry at `now`. Negative ages (clock skew) clamp to zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.cached_at()).to_std().unwrap_or_default()
    }

    /// Whether the entry is younger than `window` at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age_at(now) < window
    }
}

/// Cache policy over a shared state store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn StateStore>,
    freshness: Duration,
}

/// Store key for `ip`.
pub fn cache_key(ip: &Ipv4) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, ip)
}

impl Cache {
    /// Creates a cache with the standard 24 hour freshness window.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_freshness(store, CACHE_FRESHNESS_WINDOW)
    }

    pub fn with_freshness(store: Arc<dyn StateStore>, freshness: Duration) -> Self {
        Cache { store, freshness }
    }

    /// Freshness window applied by [`get`](Self::get).
    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Fresh record for `ip`, or `None` if absent or stale.
    pub fn get(&self, ip: &Ipv4) -> Result<Option<LocationRecord>, StorageError> {
        self.get_at(ip, Utc::now())
    }

    /// Fresh record for `ip` as of `now`.
    pub fn get_at(
        &self,
        ip: &Ipv4,
        now: DateTime<Utc>,
    ) -> Result<Option<LocationRecord>, StorageError> {
        Ok(self.fresh_entry_at(ip, now)?.map(|entry| entry.record))
    }

    /// Fresh entry (record and timestamp) for `ip` as of `now`.
    pub fn fresh_entry_at(
        &self,
        ip: &Ipv4,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, StorageError> {
        match self.entry(ip)? {
            Some(entry) if entry.is_fresh_at(now, self.freshness) => {
                log::debug!("Cache hit for {}", ip);
                Ok(Some(entry))
            }
            Some(entry) => {
                log::debug!(
                    "Ignoring stale cache entry for {} ({}s old)",
                    ip,
                    entry.age_at(now).as_secs()
                );
                Ok(None)
            }
            None => {
                log::debug!("Cache miss for {}", ip);
                Ok(None)
            }
        }
    }

    /// Raw entry for `ip`, fresh or not.
    pub fn entry(&self, ip: &Ipv4) -> Result<Option<CacheEntry>, StorageError> {
        storage::load(self.store.as_ref(), &cache_key(ip))
    }

    /// Stores `record` for `ip` with the current time, replacing any entry.
    pub fn put(&self, ip: &Ipv4, record: &LocationRecord) -> Result<(), StorageError> {
        self.put_at(ip, record, Utc::now())
    }

    /// Stores `record` for `ip` stamped with `now`.
    pub fn put_at(
        &self,
        ip: &Ipv4,
        record: &LocationRecord,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry {
            record: record.clone(),
            timestamp: now.timestamp_millis(),
        };
        storage::save(self.store.as_ref(), &cache_key(ip), &entry)
    }

    /// Removes the entry for `ip`.
    pub fn evict(&self, ip: &Ipv4) -> Result<(), StorageError> {
        self.store.remove(&cache_key(ip))
    }

    /// Removes every cached entry and all other persisted state, including the
    /// last-result slots.
    pub fn clear(&self) -> Result<(), StorageError> {
        log::info!("Clearing lookup cache");
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeDelta;
    use serde_json::json;

    fn ip(s: &str) -> Ipv4 {
        s.parse().expect("valid ip")
    }

    fn cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    fn record(addr: &str) -> LocationRecord {
        LocationRecord {
            city: Some("Amsterdam".to_string()),
            ..LocationRecord::new(addr, "ipinfo.io")
        }
    }

    #[test]
    fn test_freshness_window_boundaries() {
        let cache = cache();
        let addr = ip("45.33.32.156");
        let written = Utc::now();
        cache.put_at(&addr, &record("45.33.32.156"), written).expect("put");

        let almost = written + TimeDelta::hours(23) + TimeDelta::minutes(59);
        assert_eq!(
            cache.get_at(&addr, almost).expect("get"),
            Some(record("45.33.32.156"))
        );

        let past = written + TimeDelta::hours(24) + TimeDelta::minutes(1);
        assert_eq!(cache.get_at(&addr, past).expect("get"), None);
    }

    #[test]
    fn test_stale_entry_is_not_purged() {
        let cache = cache();
        let addr = ip("45.33.32.156");
        let written = Utc::now() - TimeDelta::days(3);
        cache.put_at(&addr, &record("45.33.32.156"), written).expect("put");

        assert_eq!(cache.get(&addr).expect("get"), None);
        let entry = cache.entry(&addr).expect("entry").expect("still stored");
        assert_eq!(entry.timestamp, written.timestamp_millis());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = cache();
        let addr = ip("9.9.9.9");
        let old = Utc::now() - TimeDelta::days(2);
        cache.put_at(&addr, &record("9.9.9.9"), old).expect("put");

        let mut newer = record("9.9.9.9");
        newer.provider = "ip-api.com".to_string();
        cache.put(&addr, &newer).expect("put");
        assert_eq!(cache.get(&addr).expect("get"), Some(newer));
    }

    #[test]
    fn test_evict_and_clear() {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(store.clone());
        cache.put(&ip("1.1.1.1"), &record("1.1.1.1")).expect("put");
        cache.put(&ip("8.8.8.8"), &record("8.8.8.8")).expect("put");
        store.set("last_ip", &json!("8.8.8.8")).expect("set");

        cache.evict(&ip("1.1.1.1")).expect("evict");
        assert_eq!(cache.get(&ip("1.1.1.1")).expect("get"), None);
        assert!(cache.get(&ip("8.8.8.8")).expect("get").is_some());

        cache.clear().expect("clear");
        assert_eq!(cache.get(&ip("8.8.8.8")).expect("get"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reads_entries_written_with_data_field() {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(store.clone());
        let now = Utc::now();
        store
            .set(
                "ip_cache_1.0.0.1",
                &json!({
                    "data": {"ip": "1.0.0.1", "provider": "ipapi.co", "city": "Brisbane"},
                    "timestamp": now.timestamp_millis()
                }),
            )
            .expect("set");
        let found = cache.get_at(&ip("1.0.0.1"), now).expect("get").expect("hit");
        assert_eq!(found.city.as_deref(), Some("Brisbane"));
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(&ip("10.1.2.3")), "ip_cache_10.1.2.3");
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let entry = CacheEntry {
            record: record("1.1.1.1"),
            timestamp: (Utc::now() + TimeDelta::minutes(5)).timestamp_millis(),
        };
        assert_eq!(entry.age_at(Utc::now()), Duration::ZERO);
        assert!(entry.is_fresh_at(Utc::now(), CACHE_FRESHNESS_WINDOW));
    }
}
