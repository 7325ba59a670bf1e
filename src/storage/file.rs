//! JSON file backend

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{Storage, StorageError, StorageResult};

/// Store persisted as a single JSON object of strings
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written session behind.
pub struct FileStorage {
    path: PathBuf,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Load for a read-modify-write; a corrupt file is replaced, not kept
    async fn load_for_write(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.load().await {
            Err(StorageError::Corrupt { message, .. }) => {
                tracing::warn!(path = ?self.path, error = %message, "Replacing corrupt store");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_for_write().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { message, .. }) => {
                tracing::warn!(path = ?self.path, error = %message, "Replacing corrupt store");
                return self.save(&BTreeMap::new()).await;
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries).await
    }
}
