//! # Browser `localStorage` collection store
//!
//! [`LocalStorageStore`] is the [`CollectionStore`] used on the **web
//! platform**. Each collection is one `localStorage` entry holding a JSON
//! string, under the same key names the society application has always used,
//! so existing browser data is picked up as-is.
//!
//! ## Error handling
//!
//! `localStorage` can be missing (privacy modes, non-window contexts) or full.
//! All methods swallow those errors: reads return `None`, writes are logged and
//! dropped. The UI then behaves as if there were no local data.
//!
//! ## Concurrency
//!
//! Every tab shares the origin's storage area. Writes replace whole
//! collections, so concurrent tabs overwrite each other (last writer wins).

use crate::repo::CollectionStore;

/// `window.localStorage`-backed CollectionStore for the web platform.
///
/// An optional prefix namespaces keys, e.g. `"branch-2:"` → `"branch-2:members"`.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore {
    prefix: String,
}

impl LocalStorageStore {
    /// Use the unprefixed keys.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

impl CollectionStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(&self.full_key(key)).ok()?
    }

    fn set(&self, key: &str, value: String) {
        let Some(storage) = Self::storage() else {
            tracing::warn!("localStorage unavailable; dropping write to {key:?}");
            return;
        };
        if storage.set_item(&self.full_key(key), &value).is_err() {
            tracing::warn!("localStorage rejected write to {key:?} (quota?)");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.full_key(key));
        }
    }
}
