//! Snapshot storage backends
//!
//! A store holds exactly one value and replaces it whole on every write.
//! A missing or unreadable value reads as `None`; callers treat that as a miss.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::CacheBackend;
use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// Whole-value snapshot storage
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Read the current value, `None` if absent or unreadable
    async fn read(&self) -> Option<Arc<T>>;

    /// Replace the stored value
    async fn write(&self, value: Arc<T>) -> Result<()>;

    /// Human-readable backend description for status output
    fn describe(&self) -> String;
}

/// Process-memory store
pub struct MemoryStore<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Send + Sync + 'static,
{
    async fn read(&self) -> Option<Arc<T>> {
        self.value.read().ok().and_then(|guard| guard.clone())
    }

    async fn write(&self, value: Arc<T>) -> Result<()> {
        let mut guard = self
            .value
            .write()
            .map_err(|_| CacheError::Io("memory store lock poisoned".to_string()))?;
        *guard = Some(value);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// JSON-file store.
///
/// Keeps the last decoded value and re-reads the file only when its
/// modification time changes.
pub struct FileStore<T> {
    path: PathBuf,
    loaded: Mutex<Option<(SystemTime, Arc<T>)>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    fn memo(&self, mtime: SystemTime) -> Option<Arc<T>> {
        let guard = self.loaded.lock().ok()?;
        match guard.as_ref() {
            Some((loaded_at, value)) if *loaded_at == mtime => Some(Arc::clone(value)),
            _ => None,
        }
    }

    fn remember(&self, mtime: Option<SystemTime>, value: Option<Arc<T>>) {
        if let Ok(mut guard) = self.loaded.lock() {
            *guard = mtime.zip(value);
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for FileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self) -> Option<Arc<T>> {
        let mtime = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.modified().ok(),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to stat cache file {}: {}", self.path.display(), e);
                }
                self.remember(None, None);
                return None;
            }
        };

        if let Some(value) = mtime.and_then(|m| self.memo(m)) {
            return Some(value);
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read cache file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                let value = Arc::new(value);
                self.remember(mtime, Some(Arc::clone(&value)));
                Some(value)
            }
            Err(e) => {
                log::warn!("Ignoring corrupt cache file {}: {}", self.path.display(), e);
                self.remember(None, None);
                None
            }
        }
    }

    async fn write(&self, value: Arc<T>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CacheError::Io(format!("Failed to create cache dir {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_vec_pretty(value.as_ref())?;

        // Write beside the target then rename, so readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json).await.map_err(|e| {
            CacheError::Io(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            CacheError::Io(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        let mtime = tokio::fs::metadata(&self.path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());
        self.remember(mtime, Some(value));
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file ({})", self.path.display())
    }
}

/// Open the configured backend for one cache.
pub fn open_store<T>(
    backend: CacheBackend,
    dir: &Path,
    file_name: &str,
) -> Arc<dyn SnapshotStore<T>>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    match backend {
        CacheBackend::Memory => Arc::new(MemoryStore::<T>::new()),
        CacheBackend::File => Arc::new(FileStore::<T>::new(dir.join(file_name))),
    }
}
