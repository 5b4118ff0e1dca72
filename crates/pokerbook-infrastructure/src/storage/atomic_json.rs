//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe access to the JSON documents Pokerbook keeps
//! on disk (ledger data and configuration).

use pokerbook_core::LedgerError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic JSON operations.
#[derive(Debug, Error)]
pub enum AtomicJsonError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicJsonError> for LedgerError {
    fn from(err: AtomicJsonError) -> Self {
        match err {
            AtomicJsonError::Json { .. } => LedgerError::Serialization {
                format: "JSON".to_string(),
                message: err.to_string(),
            },
            other => LedgerError::io(other.to_string()),
        }
    }
}

/// A handle to a JSON file that is replaced atomically.
///
/// - Writes go to a sibling tmp file, are fsynced, then renamed over the target
/// - `replace` holds an exclusive fs2 lock while writing
/// - A missing or blank file loads as `None`
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data = serde_json::from_str(&content).map_err(|source| AtomicJsonError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(data))
    }

    /// Serializes `data` and replaces the file with it.
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(data).map_err(|source| AtomicJsonError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp_file
            .write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp_file.sync_all().map_err(|e| self.io_error(e))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Saves under an exclusive lock without reading the current contents,
    /// so a corrupt file can still be overwritten.
    pub fn replace(&self, data: &T) -> Result<(), AtomicJsonError> {
        let _lock = FileLock::acquire(&self.path)?;
        self.save(data)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            self.io_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }

    fn io_error(&self, source: std::io::Error) -> AtomicJsonError {
        AtomicJsonError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Exclusive lock guard, released and removed on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        let lock_path = path.with_extension("lock");
        let io_error = |source: std::io::Error| AtomicJsonError::Io {
            path: lock_path.clone(),
            source,
        };

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| AtomicJsonError::Lock(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
