//! Key-value storage for serialised application state.
//!
//! A store maps string keys to text values. `FileStore` keeps one JSON file
//! per key inside a data directory, and `MemoryStore` keeps everything in a
//! map for tests and throwaway sessions.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Text key-value persistence used by the repository.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Directory-backed store: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(buf) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Atomic-ish write via temp + rename.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(value.as_bytes())?;
            f.flush()?;
            fs::rename(&tmp, &path)
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Io(e));
        }
        Ok(())
    }
}

/// In-memory store. Writes can be made to fail to exercise degraded persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with a single entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `set` fail as if the quota were exhausted.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::Other,
                "storage quota exceeded",
            )));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("tasks").unwrap().is_none());
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
        assert!(store.path_for("tasks").exists());
        assert!(!dir.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn test_file_store_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("gone"));
        assert!(matches!(store.set("tasks", "[]"), Err(Error::Io(_))));
    }

    #[test]
    fn test_file_store_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        // A directory where the target file should go makes the rename fail.
        fs::create_dir(store.path_for("tasks")).unwrap();
        fs::write(store.path_for("tasks").join("keep"), "x").unwrap();

        assert!(matches!(store.set("tasks", "[]"), Err(Error::Io(_))));
        assert!(!dir.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        assert!(store.set("tasks", "[]").is_err());
        assert!(store.get("tasks").unwrap().is_none());
    }
}
