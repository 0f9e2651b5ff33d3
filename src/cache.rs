//! Response cache stores.
//!
//! The cache never expires or invalidates entries: a key written once is served until the
//! store is cleared from outside.

use crate::error::{Error, Result};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key/value store for oracle responses.
pub trait CacheStore {
    fn exists(&self, key: &str) -> Result<bool>;
    fn get(&self, key: &str) -> Result<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Content-addressed on-disk cache.
///
/// Each value lives in `<root>/<sha256(key)>.txt`, so arbitrary keys (file paths,
/// `METHOD /path` pairs) map to safe file names.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Opens (and creates if needed) a cache rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        debug!("Using response cache at {}", root.display());
        Ok(Self { root: root.to_path_buf() })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{:x}.txt", Sha256::digest(key.as_bytes())))
    }
}

impl CacheStore for FileCache {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entry_path(key).is_file())
    }

    fn get(&self, key: &str) -> Result<String> {
        let path = self.entry_path(key);
        fs::read_to_string(&path)
            .map_err(|e| Error::CacheError(format!("failed to read entry for {}: {}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        fs::write(&path, value)
            .map_err(|e| Error::CacheError(format!("failed to write entry for {}: {}", key, e)))
    }
}

/// Process-local cache, used when persistence is disabled and in tests.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::CacheError("memory cache lock poisoned".to_string()))
    }
}

impl CacheStore for MemoryCache {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    fn get(&self, key: &str) -> Result<String> {
        self.lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| Error::CacheError(format!("no entry for {}", key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
