//! File-backed key-value store
//!
//! Maps each key to a single JSON file under a data directory. Keys are
//! percent-encoded so namespaced keys like `essence:mood:luna` produce
//! valid filenames on every platform.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::storage::KvStore;

const VALUE_EXTENSION: &str = "json";

/// Key-value store persisting each entry as a file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory this store persists into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = urlencoding::encode(key);
        self.root.join(format!("{encoded}.{VALUE_EXTENSION}"))
    }

    fn key_for(path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        urlencoding::decode(stem).ok().map(|k| k.into_owned())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        entries
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some(VALUE_EXTENSION))
            .filter_map(|e| Self::key_for(&e.path()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_store() -> (FileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let (store, _dir) = open_temp_store();

        store.set("essence:mood:luna", "[1,2,3]").unwrap();
        assert_eq!(store.get("essence:mood:luna").as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _dir) = open_temp_store();
        assert!(store.get("absent").is_none());
    }

    #[test]
    fn test_set_overwrites_prior_value() {
        let (store, _dir) = open_temp_store();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = open_temp_store();

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());

        // Removing again should not error
        store.remove("k").unwrap();
    }

    #[test]
    fn test_keys_survive_encoding() {
        let (store, _dir) = open_temp_store();

        store.set("essence:mood:luna/8", "a").unwrap();
        store.set("plain", "b").unwrap();

        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["essence:mood:luna/8", "plain"]);
    }

    #[test]
    fn test_values_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("k", "persisted").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("persisted"));
    }
}
