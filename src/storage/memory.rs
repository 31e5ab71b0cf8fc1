//! In-memory state store.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::StateStore;
use crate::error_handling::StorageError;

/// A process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // every write is a single map operation, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove_clear() {
        let store = MemoryStore::new();
        store.set("a", &json!(1)).expect("set");
        store.set("b", &json!("two")).expect("set");
        assert_eq!(store.get("a").expect("get"), Some(json!(1)));
        assert_eq!(store.len(), 2);

        store.set("a", &json!(3)).expect("overwrite");
        assert_eq!(store.get("a").expect("get"), Some(json!(3)));

        store.remove("a").expect("remove");
        store.remove("a").expect("remove missing");
        assert_eq!(store.get("a").expect("get"), None);

        store.clear().expect("clear");
        assert!(store.is_empty());
    }
}
