//! Persisted state shared by every lookup context.
//!
//! The store is a flat key/value map of JSON values: cache entries under
//! `ip_cache_<ip>` plus the last-result slots. There are no transactions;
//! concurrent writers to the same key race and the last write wins.

mod file;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error_handling::StorageError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key/value storage for JSON values.
pub trait StateStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key this crate stores: cache entries and the
    /// last-result slots.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Reads `key` and deserializes it as `T`.
///
/// A value that no longer matches `T` (e.g. written by an older version) is
/// logged and treated as absent.
pub fn load<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(value) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            log::warn!("Ignoring unreadable state for '{}': {}", key, e);
            Ok(None)
        }
    }
}

/// Serializes `value` and stores it under `key`.
pub fn save<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<(), StorageError> {
    let value = serde_json::to_value(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &value)
}
