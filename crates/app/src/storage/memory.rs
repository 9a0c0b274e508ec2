//! In-memory store.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::storage::{KeyValueStore, StorageError};

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        entries.remove(key);

        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        entries.clear();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn set_get_remove() -> TestResult {
        let store = MemoryStore::new();

        store.set("a", "1")?;
        assert_eq!(store.get("a")?.as_deref(), Some("1"));

        store.remove("a")?;
        store.remove("a")?;
        assert_eq!(store.get("a")?, None);

        Ok(())
    }

    #[test]
    fn clear_drops_every_key() -> TestResult {
        let store = MemoryStore::new();
        store.set("a", "1")?;
        store.set("b", "2")?;

        store.clear()?;

        assert_eq!(store.get("a")?, None);
        assert_eq!(store.get("b")?, None);

        Ok(())
    }
}
