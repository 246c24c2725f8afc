//! Guest favorites: an ordered id set in durable local storage.
//!
//! Everything here is synchronous and local; a guest never touches the
//! network for favorites.

use agendatico_core::constants::FAVORITES_STORAGE_KEY;

use crate::ToggleResolution;
use crate::membership::flip;
use crate::storage::KeyValueStorage;

pub struct LocalFavorites<S: KeyValueStorage> {
    storage: S,
    set: Vec<i64>,
}

impl<S: KeyValueStorage> LocalFavorites<S> {
    /// Loads the guest set from storage. Anything unreadable (missing key,
    /// mangled JSON) starts the session with an empty set.
    pub fn new(storage: S) -> Self {
        let set = storage
            .get(FAVORITES_STORAGE_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<i64>>(&raw).ok())
            .unwrap_or_default();
        Self { storage, set }
    }

    #[must_use]
    pub fn is_favorited(&self, event_id: i64) -> bool {
        self.set.contains(&event_id)
    }

    #[must_use]
    pub fn list(&self) -> Vec<i64> {
        self.set.clone()
    }

    /// Flips membership, persists the new set, and reports whether the write
    /// landed. The in-memory flip holds either way; `persisted: false` is
    /// the caller's cue that storage and state have diverged.
    pub fn toggle(&mut self, event_id: i64) -> ToggleResolution {
        let is_favorited = flip(&mut self.set, event_id);
        let persisted = self.persist();

        if !persisted {
            tracing::warn!(event_id, "Guest favorite toggle not persisted to storage");
        }

        ToggleResolution::Confirmed {
            is_favorited,
            favorites_count: None,
            persisted,
        }
    }

    /// Drops the whole guest set, storage included. Called after a
    /// successful migration into an account.
    pub fn clear(&mut self) {
        self.set.clear();
        self.storage.remove(FAVORITES_STORAGE_KEY);
    }

    fn persist(&self) -> bool {
        match serde_json::to_string(&self.set) {
            Ok(raw) => self.storage.set(FAVORITES_STORAGE_KEY, &raw),
            Err(_unserializable) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn stored_set(local: &LocalFavorites<MemoryStorage>) -> Vec<i64> {
        local
            .storage
            .get(FAVORITES_STORAGE_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    #[test]
    fn toggle_parity_matches_membership() {
        let mut local = LocalFavorites::new(MemoryStorage::new());

        for round in 1..=5 {
            let resolution = local.toggle(42);
            let expected = round % 2 == 1;
            assert_eq!(resolution.is_favorited(), expected);
            assert_eq!(local.is_favorited(42), expected);
        }
    }

    #[test]
    fn storage_always_reflects_the_final_set() {
        let mut local = LocalFavorites::new(MemoryStorage::new());
        local.toggle(1);
        local.toggle(2);
        local.toggle(1);
        local.toggle(3);

        assert_eq!(local.list(), vec![2, 3]);
        assert_eq!(stored_set(&local), vec![2, 3]);
    }

    #[test]
    fn set_survives_a_reload() {
        let storage = MemoryStorage::new();
        storage.set(FAVORITES_STORAGE_KEY, "[7,9]");

        let local = LocalFavorites::new(storage);
        assert_eq!(local.list(), vec![7, 9]);
        assert!(local.is_favorited(9));
    }

    #[test]
    fn mangled_storage_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set(FAVORITES_STORAGE_KEY, "{not json");

        let local = LocalFavorites::new(storage);
        assert!(local.list().is_empty());
    }

    #[test]
    fn clear_empties_memory_and_storage() {
        let mut local = LocalFavorites::new(MemoryStorage::new());
        local.toggle(1);
        local.clear();

        assert!(local.list().is_empty());
        assert_eq!(local.storage.get(FAVORITES_STORAGE_KEY), None);
    }

    #[test]
    fn failed_writes_are_surfaced_not_swallowed() {
        struct RefusingStorage;
        impl KeyValueStorage for RefusingStorage {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }
            fn set(&self, _key: &str, _value: &str) -> bool {
                false
            }
            fn remove(&self, _key: &str) -> bool {
                false
            }
        }

        let mut local = LocalFavorites::new(RefusingStorage);
        let resolution = local.toggle(5);

        assert!(matches!(
            resolution,
            ToggleResolution::Confirmed {
                is_favorited: true,
                persisted: false,
                ..
            }
        ));
        // The optimistic flip still holds in memory.
        assert!(local.is_favorited(5));
    }
}
