use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use super::{check_quota, entry_size, KeyValueStore, StorageError};

/// Durable store: every key lives in one JSON object file.
///
/// Reads refresh from disk so two handles on the same file see each other's
/// writes; a write merges only its own key into the on-disk object.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    capacity: Option<usize>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: None,
        }
    }

    pub fn with_capacity_bytes(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let payload = read_json_object(&self.path).unwrap_or_default();
        Ok(payload.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut on_disk = read_json_object(&self.path).unwrap_or_default();
        if on_disk.get(key).and_then(Value::as_str) == Some(value) {
            return Ok(());
        }
        let others = on_disk
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, row)| entry_size(existing, row.as_str().unwrap_or_default()));
        check_quota(key, value, others, self.capacity)?;
        on_disk.insert(key.to_string(), Value::String(value.to_string()));
        write_json_object(&self.path, &on_disk)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut on_disk = read_json_object(&self.path).unwrap_or_default();
        if on_disk.remove(key).is_some() {
            write_json_object(&self.path, &on_disk)?;
        }
        Ok(())
    }
}

fn read_json_object(path: &Path) -> Option<Map<String, Value>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    parsed.as_object().cloned()
}

fn write_json_object(path: &Path, payload: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(
        path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )
    .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
