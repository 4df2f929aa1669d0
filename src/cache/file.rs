//! File-backed cache backend
//!
//! All keys live in one JSON object on disk, e.g.
//!
//! ```json
//! { "gold:last:sjc": { "vendor": "sjc", "last_reading": { ... }, "updated_at": "..." } }
//! ```
//!
//! The document is held in memory and rewritten atomically (temp file then
//! rename) on every write.

use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Default cache location
pub const DEFAULT_CACHE_FILE: &str = "/tmp/last_prices.json";

/// JSON document cache on local disk
pub struct FileBackend {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl FileBackend {
    /// Open the cache file at `path`, creating parent directories as needed
    ///
    /// A missing file starts an empty cache. A file that is not a JSON object
    /// is logged and replaced on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::parse_document(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = ?path, entries = document.len(), "Opened price cache file");

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_document(path: &Path, content: &str) -> Map<String, Value> {
        if content.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!(path = ?path, "Cache file is not a JSON object, starting empty");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to parse cache file, starting empty");
                Map::new()
            }
        }
    }

    async fn persist(&self, document: &Map<String, Value>) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(document)
            .map_err(|e| CacheError::StorageUnavailable(e.to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, serialized).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let document = self.document.lock().await;
        Ok(document.get(key).map(Value::to_string))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), CacheError> {
        let value: Value = serde_json::from_str(&value).map_err(|e| {
            CacheError::StorageUnavailable(format!("value for {} is not JSON: {}", key, e))
        })?;

        let mut document = self.document.lock().await;
        let mut updated = document.clone();
        updated.insert(key.to_string(), value);

        self.persist(&updated).await?;
        *document = updated;

        tracing::debug!(key, path = ?self.path, "Saved cache entry to file");
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let document = self.document.lock().await;
        if document.is_empty() {
            return Ok(());
        }
        self.persist(&document).await
    }
}
