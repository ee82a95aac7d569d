//! Response store trait and its disk, in-memory, and no-op backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::Error;

/// Storage backend for decoded API responses.
///
/// Implementations map an opaque request hash to a previously decoded
/// JSON response. Entries are frozen once written; the only way to drop
/// them is [`ResponseStore::invalidate_all`], which discards every entry
/// at once - there is no per-key eviction.
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    /// Look up a cached response by key. A miss returns `None`.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Persist a response under the given key.
    async fn put(&self, key: &str, value: &Value) -> Result<(), Error>;

    /// Discard every cached entry.
    async fn invalidate_all(&self) -> Result<(), Error>;
}

/// Store implementation that doesn't cache anything.
///
/// Used when no cache directory is configured - all operations are no-ops.
pub struct NoopStore;

#[async_trait::async_trait]
impl ResponseStore for NoopStore {
    async fn get(&self, _key: &str) -> Option<Value> {
        None // Always miss
    }

    async fn put(&self, _key: &str, _value: &Value) -> Result<(), Error> {
        Ok(()) // Discard
    }

    async fn invalidate_all(&self) -> Result<(), Error> {
        Ok(()) // Nothing to drop
    }
}

/// In-memory store for unit tests and short-lived processes.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResponseStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), Error> {
        self.entries.write().await.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn invalidate_all(&self) -> Result<(), Error> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Disk-backed store with one `{hash}.json` file per cache key.
///
/// The directory is created on first write. There is no cross-process
/// locking: concurrent writers race with last-writer-wins semantics.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is not touched until the first `put`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the cache entry files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl ResponseStore for DiskStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let bytes = tokio::fs::read(&path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // An undecodable entry is treated as a miss; the next
                // successful fetch overwrites it.
                tracing::debug!("discarding unreadable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| Error::CreateDir { path: self.dir.clone(), source })?;

        let path = self.entry_path(key);
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| Error::WriteEntry { path, source })?;

        Ok(())
    }

    async fn invalidate_all(&self) -> Result<(), Error> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // A store that was never written to has nothing to clear.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(Error::ClearDir { path: self.dir.clone(), source }),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| Error::ClearDir { path: self.dir.clone(), source })?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|source| Error::ClearDir { path: self.dir.clone(), source })?;
                removed += 1;
            }
        }

        tracing::debug!("invalidated {} cache entries in {}", removed, self.dir.display());
        Ok(())
    }
}
