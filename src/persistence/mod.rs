//! Key-value persistence for named integers
//!
//! Stores:
//! - `MemoryStore`: in-process map, can be switched to fail every write
//! - `JsonFileStore`: one JSON object on disk, replaced atomically on write

mod file;

pub use file::JsonFileStore;

use std::collections::BTreeMap;

use crate::error::PersistenceError;

/// Storage for named integers
pub trait PersistenceStore: Send {
    /// Read `key`, or `default` if it was never written
    fn get_int(&self, key: &str, default: i64) -> i64;

    fn put_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: i64) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value);
        store
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }
}

impl PersistenceStore for MemoryStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::Unavailable(format!("write of {key} refused")));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
