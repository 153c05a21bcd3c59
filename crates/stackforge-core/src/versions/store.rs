//! Persistent key-value storage for the version cache

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Key the version cache record is stored under
pub const CACHE_KEY: &str = "version-cache";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage that survives across process invocations, scoped to the tool
///
/// Writes replace the whole value for a key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Cached latest-version answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Package name to version range
    pub versions: BTreeMap<String, String>,
    /// Epoch milliseconds of the last successful refresh
    pub last_fetch: u64,
}

impl CacheRecord {
    /// Load the record, treating a missing or unreadable value as empty
    pub fn load(store: &dyn KeyValueStore) -> Self {
        store
            .get(CACHE_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let value = serde_json::to_value(self).map_err(|source| StoreError::Encode {
            key: CACHE_KEY.to_string(),
            source,
        })?;
        store.set(CACHE_KEY, value)
    }

    pub fn age_millis(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_fetch)
    }

    pub fn is_fresh(&self, now: u64, window_millis: u64) -> bool {
        self.last_fetch > 0 && self.age_millis(now) < window_millis
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform cache directory for `namespace`, unless `override_dir` is given
    pub fn default_dir(namespace: &str, override_dir: Option<PathBuf>) -> Option<PathBuf> {
        override_dir.or_else(|| {
            directories::ProjectDirs::from("dev", "stackforge", namespace)
                .map(|dirs| dirs.cache_dir().to_path_buf())
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let text = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Ignoring unreadable cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        let text = serde_json::to_string_pretty(&value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        // Whole-file replacement: readers see the old or the new record, never a mix
        std::fs::write(&tmp, text).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-process store for tests and `--no-cache` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
