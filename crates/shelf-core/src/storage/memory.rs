//! In-memory slot store (no persistence)

use std::collections::HashMap;
use std::sync::Mutex;

use super::{SlotStore, StorageResult};

/// Slot store backed by a map; contents are lost when it is dropped
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    items: Mutex<HashMap<String, String>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for InMemorySlotStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_contract() {
        let store = InMemorySlotStore::new();
        assert!(store.is_empty());
        assert!(store.get_item("library-books").unwrap().is_none());

        store.set_item("library-books", "[]").unwrap();
        assert_eq!(store.get_item("library-books").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);

        store.set_item("library-books", "[1]").unwrap();
        assert_eq!(store.get_item("library-books").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.len(), 1);

        store.remove_item("library-books").unwrap();
        store.remove_item("library-books").unwrap();
        assert!(store.get_item("library-books").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let store = InMemorySlotStore::new();
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_item("b").unwrap().as_deref(), Some("2"));
    }
}
