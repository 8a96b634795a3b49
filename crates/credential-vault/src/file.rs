//! File-backed storage backend.

use crate::{VaultError, VaultResult, VaultStorage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// JSON-file-backed storage.
///
/// The whole map is rewritten on every mutation; the vault holds a
/// handful of small values so this stays cheap. Writes go through a
/// temp file followed by a rename so a crash mid-write never leaves a
/// truncated vault behind.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles against the backing file.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a file storage backed by the given path. The file is
    /// created lazily on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> VaultResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| VaultError::Encoding(e.to_string()))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> VaultResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(map).map_err(|e| VaultError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl VaultStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        let _guard = self.lock.lock().unwrap();
        let map = self.read_map()?;
        Ok(map.get(key).cloned())
    }

    fn delete(&self, key: &str) -> VaultResult<bool> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.write_map(&map)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("vault.json"));

        storage.set("alpha", "one").unwrap();
        storage.set("beta", "two").unwrap();

        assert_eq!(storage.get("alpha").unwrap(), Some("one".to_string()));
        assert_eq!(storage.get("beta").unwrap(), Some("two".to_string()));
        assert_eq!(storage.get("gamma").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");

        {
            let storage = FileStorage::new(path.clone());
            storage.set("token", "abc123").unwrap();
        }

        let storage = FileStorage::new(path);
        assert_eq!(storage.get("token").unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("vault.json"));

        storage.set("key", "value").unwrap();
        assert!(storage.delete("key").unwrap());
        assert!(!storage.delete("key").unwrap());
        assert_eq!(storage.get("key").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("does-not-exist.json"));

        assert_eq!(storage.get("anything").unwrap(), None);
        assert!(!storage.has("anything").unwrap());
    }

    #[test]
    fn test_file_storage_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("deep").join("vault.json"));

        storage.set("key", "value").unwrap();
        assert_eq!(storage.get("key").unwrap(), Some("value".to_string()));
    }
}
