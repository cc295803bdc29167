//! Key-value storage capability with a byte quota, modelled on browser local
//! storage: every value is a string and a write that would push the total
//! size past the quota is refused without touching existing entries.

mod file_store;

use std::collections::BTreeMap;

pub use file_store::FileStore;

pub const HISTORY_KEY: &str = "sticker_history";
pub const LIBRARY_KEY: &str = "sticker_library";
pub const SESSION_KEY: &str = "sticker_session";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded writing '{key}': {required} bytes required, capacity {capacity}")]
    QuotaExceeded {
        key: String,
        required: usize,
        capacity: usize,
    },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store, used by tests and by callers that do not need
/// durability.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bytes(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| entry_size(key, value))
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let others = self
            .entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, row)| entry_size(existing, row));
        check_quota(key, value, others, self.capacity)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

fn check_quota(
    key: &str,
    value: &str,
    others: impl Iterator<Item = usize>,
    capacity: Option<usize>,
) -> Result<(), StorageError> {
    let Some(capacity) = capacity else {
        return Ok(());
    };
    let required = others.sum::<usize>() + entry_size(key, value);
    if required > capacity {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            required,
            capacity,
        });
    }
    Ok(())
}
