use super::{Storage, StorageError};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Process-local storage.
///
/// Clones share the same entries, so a test can hand one clone to a store and
/// inspect the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// All keys, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().unwrap().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("theme", "\"dark\"").unwrap();
        assert_eq!(other.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(other.len(), 1);

        other.remove_item("theme").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("nope").unwrap(), None);
        storage.remove_item("nope").unwrap();
    }

    #[test]
    fn keys_are_sorted() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "1").unwrap();
        storage.set_item("a", "2").unwrap();
        assert_eq!(storage.keys(), vec!["a".to_string(), "b".to_string()]);
        storage.clear();
        assert!(storage.is_empty());
    }
}
