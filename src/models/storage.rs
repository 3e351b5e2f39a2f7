use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const SNIPPETS_KEY: &str = "snippets";
pub const FREQUENCY_KEY: &str = "frequency";
pub const HISTORY_KEY: &str = "history";

/// Key-value persistence the snippet store loads from and saves to
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Storage Manager for disk operations.
///
/// Every key lives in one pretty-printed JSON document which is rewritten
/// on each `set`.
#[derive(Debug)]
pub struct JsonFileStorage {
    state_file: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStorage {
    /// Opens the store under the platform data directory
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("snipwatch");

        Self::open(data_dir)
    }

    /// Opens (or creates) the store inside `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let state_file = data_dir.join("state.json");
        let entries = if state_file.exists() {
            let content =
                fs::read_to_string(&state_file).context("Failed to read state file")?;
            serde_json::from_str(&content).context("Failed to parse state JSON")?
        } else {
            Map::new()
        };

        Ok(Self {
            state_file,
            entries,
        })
    }

    fn flush(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize state")?;

        // Write to a sibling file first so a crash never leaves half a document
        let temp_path = self.state_file.with_extension("json.tmp");
        fs::write(&temp_path, content).context("Failed to write state file")?;
        fs::rename(&temp_path, &self.state_file).with_context(|| {
            format!("Failed to replace state file: {}", self.state_file.display())
        })
    }
}

impl StorageBackend for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Volatile storage, handy for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_survives_reopen() {
        let temp = TempDir::new().unwrap();

        let mut storage = JsonFileStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get(SNIPPETS_KEY).unwrap(), None);
        storage.set(SNIPPETS_KEY, json!([{"id": "1"}])).unwrap();
        storage.set(HISTORY_KEY, json!([])).unwrap();

        let reopened = JsonFileStorage::open(temp.path()).unwrap();
        assert_eq!(reopened.get(SNIPPETS_KEY).unwrap(), Some(json!([{"id": "1"}])));
        assert_eq!(reopened.get(HISTORY_KEY).unwrap(), Some(json!([])));
        assert!(!temp.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_rejects_corrupt_state() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("state.json"), "{ not json").unwrap();
        assert!(JsonFileStorage::open(temp.path()).is_err());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        storage.set(FREQUENCY_KEY, json!([1, 2])).unwrap();
        assert_eq!(storage.get(FREQUENCY_KEY).unwrap(), Some(json!([1, 2])));
        assert_eq!(storage.get("missing").unwrap(), None);
    }
}
