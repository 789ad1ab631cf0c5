use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CoreError;

use super::traits::KeyValueStorage;

/// Key-value storage persisted as a single JSON object on disk (native only).
///
/// Every write rewrites the whole file via a temporary file and rename, so a
/// crash mid-write leaves either the old or the new content.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, CoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            CoreError::Storage(format!(
                "storage file {} is not a JSON object of strings: {e}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize storage: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn locked<T>(
        &self,
        f: impl FnOnce(&Self) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::Storage("file storage lock poisoned".into()))?;
        f(self)
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, CoreError> {
        let all = self.locked(|s| s.read_all())?;
        Ok(keys
            .iter()
            .filter_map(|k| all.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: HashMap<String, String>) -> Result<(), CoreError> {
        self.locked(|s| {
            let mut all = s.read_all()?;
            all.extend(entries);
            s.write_all(&all)
        })
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), CoreError> {
        self.locked(|s| {
            let mut all = s.read_all()?;
            for key in keys {
                all.remove(*key);
            }
            s.write_all(&all)
        })
    }
}
