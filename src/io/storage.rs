use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;

/// Error type for key-value storage access
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode tree: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored tree does not match the expected shape: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("stored tree failed validation: {0}")]
    Invalid(String),
}

/// String-keyed persistent slot store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a directory. Writes are atomic.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        atomic_write(&path, value.as_bytes()).map_err(|e| StorageError::Io { path, source: e })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Process-local storage, optionally with a byte quota or disabled entirely
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any write whose value exceeds `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        MemoryStorage {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Every operation fails with [`StorageError::Unavailable`]
    pub fn disabled() -> Self {
        MemoryStorage {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota,
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        self.entries.remove(key);
        Ok(())
    }
}
