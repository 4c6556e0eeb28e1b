//! JSON file store
//!
//! The whole map is rewritten on every put: serialize to `<path>.tmp`, then
//! rename over `<path>`. A reader never sees a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::PersistenceStore;
use crate::error::PersistenceError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and treated as empty (the next put replaces it).
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match Self::read(&path) {
            Ok(Some(values)) => {
                log::info!("Loaded {} stored values from {}", values.len(), path.display());
                values
            }
            Ok(None) => {
                log::info!("No store at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    fn read(path: &Path) -> Result<Option<BTreeMap<String, i64>>, PersistenceError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write(&self, values: &BTreeMap<String, i64>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(values)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistenceStore for JsonFileStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        self.write(&next)?;
        // Only remember what reached the disk
        self.values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("scores.json"));
        assert_eq!(store.get_int("HIGH_SCORE_KEY", 0), 0);
    }

    #[test]
    fn test_put_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = JsonFileStore::open(&path);
        store.put_int("HIGH_SCORE_KEY", 41).unwrap();
        store.put_int("HIGH_SCORE_KEY", 42).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get_int("HIGH_SCORE_KEY", 0), 42);
        assert!(!dir.path().join("scores.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get_int("HIGH_SCORE_KEY", 7), 7);
        store.put_int("HIGH_SCORE_KEY", 1).unwrap();
        assert_eq!(JsonFileStore::open(&path).get_int("HIGH_SCORE_KEY", 0), 1);
    }

    #[test]
    fn test_failed_write_keeps_memory_value() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so the write fails
        let mut store = JsonFileStore::open(dir.path().join("missing").join("scores.json"));
        assert!(store.put_int("HIGH_SCORE_KEY", 5).is_err());
        assert_eq!(store.get_int("HIGH_SCORE_KEY", 0), 0);
    }
}
