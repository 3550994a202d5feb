// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/storage/mod.rs
// Version: 1.0.0
//
// This file is the module entry point for key-value persistence. Backends
// implement `StorageAdapter`; the entity store only ever sees that trait.
//
// Features:
// - In-memory backend for tests and throwaway sessions
// - Directory-backed backend with atomic writes
// - Namespaced key layout shared by all backends

pub mod adapter;
pub mod file_storage;
pub mod namespace;

pub use adapter::{MemoryStorage, StorageAdapter, StorageError, read_json, write_json};
pub use file_storage::FileStorage;
pub use namespace::{DEFAULT_PREFIX, Namespace};
