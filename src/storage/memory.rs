//! In-memory storage backend
//!
//! Backs tests and embedders that want the widget core without any
//! filesystem footprint. Also the reference behavior for the boundary:
//! what this does, the file backend must match.

use crate::storage::{KeyValueStorage, StorageError};
use std::collections::HashMap;

/// HashMap-backed storage with no persistence across processes
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_miss() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("absent"), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut storage = MemoryStorage::new();
        storage.set("key", "value").unwrap();
        assert_eq!(storage.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut storage = MemoryStorage::new();
        storage.set("key", "first").unwrap();
        storage.set("key", "second").unwrap();

        assert_eq!(storage.get("key").as_deref(), Some("second"));
        assert_eq!(storage.len(), 1);
    }
}
