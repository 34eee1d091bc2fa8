use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::repo::CollectionStore;

/// In-memory CollectionStore for testing and headless use.
///
/// Clones share the same map, so two [`crate::Repository`] values built from
/// clones behave like two browser tabs over one storage area.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CollectionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}
