use crate::error::AppError;
use crate::storage::KeyValueStore;
use std::collections::HashMap;

/// In-process store. Reads and writes can be made to fail to exercise the
/// unavailable-storage and quota-exceeded paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.items.insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        if self.fail_reads {
            return Err(AppError::io("storage is unavailable"));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::io("storage quota exceeded"));
        }
        self.items.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
