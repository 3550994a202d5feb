// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/storage/adapter.rs
// Version: 1.0.0
//
// This file defines the key-value storage contract every persistence backend
// implements, the storage error type, the in-memory backend, and the JSON
// read/write helpers used by the entity store.
//
// Tree Location:
// - src/storage/adapter.rs (storage contract and in-memory backend)
// - Depends on: serde, serde_json, thiserror, log

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

static LOG_TARGET: &str = "cmo::storage";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Path {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Directory {path:?} is read-only")]
    ReadOnlyDirectory { path: PathBuf },

    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },

    #[error("Failed to serialize value for storage")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO operation failed on {path:?}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Atomic write failed: {source}")]
    AtomicWriteError {
        #[source]
        source: std::io::Error,
    },
}

/// String key-value persistence substrate.
///
/// Mirrors the browser storage contract: a missing key reads as `None`,
/// `set` overwrites, and removing a missing key is not an error.
pub trait StorageAdapter: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage used when no data directory is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String behind.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Read and decode a JSON value.
///
/// A missing key and an undecodable value both yield `Ok(None)`; only
/// failures of the substrate itself are errors.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            debug!(target: LOG_TARGET, "Ignoring undecodable value under {}: {}", key, e);
            Ok(None)
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    storage: &dyn StorageAdapter,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let contents = serde_json::to_string(value)?;
    storage.set(key, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn memory_storage_get_set_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn read_json_tolerates_garbage() {
        let storage = MemoryStorage::new();
        storage.set("broken", "{not json").unwrap();
        storage.set("empty", "").unwrap();

        let broken: Option<Value> = read_json(&storage, "broken").unwrap();
        let empty: Option<Value> = read_json(&storage, "empty").unwrap();
        let missing: Option<Value> = read_json(&storage, "missing").unwrap();
        assert!(broken.is_none());
        assert!(empty.is_none());
        assert!(missing.is_none());
    }

    #[test]
    fn write_then_read_json() {
        let storage = MemoryStorage::new();
        write_json(&storage, "coins", &json!([{"symbol": "ETC"}])).unwrap();

        let coins: Option<Vec<Value>> = read_json(&storage, "coins").unwrap();
        assert_eq!(coins.unwrap()[0]["symbol"], "ETC");
    }
}
