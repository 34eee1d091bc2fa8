//! # Filesystem-backed collection store
//!
//! [`FileStore`] is a [`CollectionStore`] that keeps each collection in its own
//! JSON file. It is the native counterpart of the browser's `localStorage`,
//! used by desktop builds and for inspecting data by hand.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── members.json
//! ├── cheques.json
//! ├── cases138.json
//! ├── casesRCS.json
//! ├── allFamilySubmissions.json
//! └── society_app_settings.json   # TOML text despite the extension
//! ```

use std::path::PathBuf;

use crate::repo::CollectionStore;

/// Filesystem-backed CollectionStore for native persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl CollectionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: String) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&path, value) {
            tracing::warn!("Failed to write {}: {e}", path.display());
        }
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.entry_path(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SocietyConfig;
    use crate::models::Member;
    use crate::repo::Repository;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let repo = Repository::new(FileStore::new(dir.path().join("society")));
        repo.save_members(&[Member {
            member_id: "MEM0001".into(),
            name: "Asha".into(),
            ..Default::default()
        }])
        .unwrap();

        // Re-open from same directory
        let repo2 = Repository::new(FileStore::new(dir.path().join("society")));
        let members = repo2.members();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Asha");
        assert!(dir.path().join("society/members.json").exists());
    }

    #[test]
    fn test_missing_directory_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(FileStore::new(dir.path().join("absent")));

        assert!(repo.members().is_empty());
        // Removing a missing entry is harmless
        repo.clear_all();
    }

    #[test]
    fn test_config_lives_beside_collections() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(FileStore::new(dir.path().to_path_buf()));

        let config = SocietyConfig::default().with_max_guarantors(5);
        repo.set_config(&config).unwrap();

        let path = dir.path().join("society_app_settings.json");
        let raw = std::fs::read_to_string(path).unwrap();
        assert_eq!(SocietyConfig::from_toml(&raw).unwrap(), config);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        let reopened = Repository::new(FileStore::new(dir.path().to_path_buf()));
        assert_eq!(reopened.get_config(), config);
    }
}
