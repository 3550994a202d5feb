// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/storage/file_storage.rs
// Version: 1.0.0
//
// Directory-backed storage: every key lives in `<dir>/<key>.json` and every
// write goes through a temporary file that is renamed into place.

use super::adapter::{StorageAdapter, StorageError};
use log::{debug, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

static LOG_TARGET: &str = "cmo::storage::file";

#[derive(Debug, Clone)]
pub struct FileStorage {
    directory_path: PathBuf,
}

impl FileStorage {
    /// Open a file-backed store.
    /// ### Arguments
    /// * `directory_path` - Existing, writable directory that holds one file per key.
    /// ### Returns
    /// * `Result<Self, StorageError>` - The store, or an error if the directory is missing or read-only.
    pub fn new(directory_path: PathBuf) -> Result<Self, StorageError> {
        if !directory_path.is_dir() {
            return Err(StorageError::NotADirectory {
                path: directory_path,
            });
        }

        let metadata = fs::metadata(&directory_path).map_err(|e| StorageError::IoError {
            path: directory_path.clone(),
            source: e,
        })?;
        if metadata.permissions().readonly() {
            return Err(StorageError::ReadOnlyDirectory {
                path: directory_path,
            });
        }

        info!(target: LOG_TARGET, "Using data directory {:?}", directory_path);
        Ok(Self { directory_path })
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }

    /// File holding `key`. Keys must stay inside the data directory.
    pub fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.directory_path.join(format!("{key}.json")))
    }

    /// Write the value atomically.
    /// Each write gets its own temporary file in the data directory, which is
    /// then renamed over the target, so concurrent writers never share a
    /// temp file and a failed write leaves the previous value intact.
    fn write_file(&self, file_path: &Path, contents: &str) -> Result<(), StorageError> {
        let mut temp_file = NamedTempFile::new_in(&self.directory_path)
            .map_err(|e| StorageError::AtomicWriteError { source: e })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| StorageError::AtomicWriteError { source: e })?;
        temp_file
            .flush()
            .map_err(|e| StorageError::AtomicWriteError { source: e })?;

        temp_file
            .persist(file_path)
            .map_err(|e| StorageError::AtomicWriteError { source: e.error })?;

        debug!(target: LOG_TARGET, "Saved {} bytes to {:?}", contents.len(), file_path);
        Ok(())
    }
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.file_path(key)?;
        match fs::read_to_string(&file_path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError {
                path: file_path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;
        self.write_file(&file_path, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;
        match fs::remove_file(&file_path) {
            Ok(()) => {
                debug!(target: LOG_TARGET, "Removed {:?}", file_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError {
                path: file_path,
                source: e,
            }),
        }
    }
}

// Changelog:
// - v1.0.0 (2026-10-19): Initial file-backed storage.
//   - Purpose: Persists the entity store across runs, one JSON file per key.
//   - Features: Directory validation on open, key validation that keeps every
//     file inside the data directory, atomic temp-file-and-rename writes.
// - v1.0.1 (2026-10-19): One temporary file per write.
//   - Concurrent writers to the same key no longer race on a shared
//     `<key>.tmp`; temp files come from `tempfile::NamedTempFile`.
