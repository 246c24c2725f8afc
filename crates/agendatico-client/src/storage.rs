//! Durable client-local key-value storage, browser-localStorage shaped:
//! synchronous, string-valued, best-effort.

use std::collections::HashMap;
use std::sync::Mutex;

/// Minimal durable storage interface. Writes report success as a bool
/// instead of an error: storage is best-effort by contract and callers
/// decide how loudly to care.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns whether the write actually landed.
    fn set(&self, key: &str, value: &str) -> bool;
    /// Returns whether a removal happened (false also covers missing keys).
    fn remove(&self, key: &str) -> bool;
}

/// In-memory storage. The default guest backend in tests and in headless
/// embeddings without a real persistence layer.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
                true
            }
            Err(_poisoned) => false,
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries
            .lock()
            .ok()
            .is_some_and(|mut entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        assert!(storage.set("k", "v"));
        assert_eq!(storage.get("k"), Some("v".to_string()));
        assert!(storage.remove("k"));
        assert_eq!(storage.get("k"), None);
        assert!(!storage.remove("k"));
    }
}
