use crate::errors::{HabitError, StorageError};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

pub const HABITS_KEY: &str = "@habits";
pub const PROGRESS_KEY: &str = "@progress_data";

/// Minimal string store the tracker persists through.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let name = key.trim_start_matches('@');
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(StorageError::Backend(format!("unsupported key '{key}'")));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&tmp, value).await.map_err(io_err)?;
        fs::rename(&tmp, &path).await.map_err(io_err)?;
        debug!(key, path = %path.display(), "persisted");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }
}

/// A value persisted whole under one key.
///
/// Remembers the exact blob it last loaded or wrote, so a write that would
/// clobber someone else's change is refused instead of silently lost. The
/// in-memory value only changes after the store accepted the new blob.
#[derive(Debug)]
pub struct Document<T> {
    key: &'static str,
    value: T,
    snapshot: Option<String>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub async fn load<S: KeyValueStore>(store: &S, key: &'static str) -> Result<Self, StorageError> {
        let snapshot = store.get(key).await?;
        let value = match snapshot.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })?,
            None => T::default(),
        };
        Ok(Self { key, value, snapshot })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Fixes up the loaded value in memory. The stored blob is left alone
    /// until the next commit.
    pub fn repair(&mut self, fix: impl FnOnce(&mut T)) {
        fix(&mut self.value);
    }

    pub async fn commit<S: KeyValueStore>(&mut self, store: &S, value: T) -> Result<(), HabitError> {
        let payload = serde_json::to_string_pretty(&value).map_err(|source| StorageError::Serialize {
            key: self.key.to_string(),
            source,
        })?;

        let current = store.get(self.key).await?;
        if current != self.snapshot {
            warn!(key = self.key, "stored data changed underneath us, refusing to overwrite");
            return Err(HabitError::ConcurrentModification {
                key: self.key.to_string(),
            });
        }

        store.set(self.key, payload.clone()).await?;
        self.value = value;
        self.snapshot = Some(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_and_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();

        assert_eq!(store.get(HABITS_KEY).await.unwrap(), None);
        store.set(HABITS_KEY, "[]".into()).await.unwrap();
        assert_eq!(store.get(HABITS_KEY).await.unwrap().as_deref(), Some("[]"));
        assert!(store.dir().join("habits.json").exists());
        assert!(!store.dir().join("habits.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(store.get("../escape").await.is_err());
    }

    #[tokio::test]
    async fn document_refuses_to_clobber_foreign_writes() {
        let store = MemoryStore::new();
        let mut doc: Document<Vec<u32>> = Document::load(&store, PROGRESS_KEY).await.unwrap();
        doc.commit(&store, vec![1]).await.unwrap();

        store.set(PROGRESS_KEY, "[7]".into()).await.unwrap();
        let err = doc.commit(&store, vec![1, 2]).await.unwrap_err();
        assert!(matches!(err, HabitError::ConcurrentModification { .. }));
        assert_eq!(doc.get(), &vec![1]);
        assert_eq!(store.get(PROGRESS_KEY).await.unwrap().as_deref(), Some("[7]"));
    }

    #[tokio::test]
    async fn corrupt_blob_is_an_error_not_an_empty_collection() {
        let store = MemoryStore::new();
        store.set(HABITS_KEY, "{not json".into()).await.unwrap();
        let err = Document::<Vec<u32>>::load(&store, HABITS_KEY).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
