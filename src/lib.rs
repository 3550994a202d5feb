// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.0
//
// This file serves as the main library entry point for cmo, located at the
// root of the source tree. It exports all public modules and the types the
// binary and the integration tests use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, storage, store, simulation, mining, server,
//   logging, utils

pub mod core;
pub mod logging;
pub mod mining;
pub mod server;
pub mod simulation;
pub mod storage;
pub mod store;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::core::{ClockSettings, EntityKind, Record};
pub use crate::storage::{FileStorage, MemoryStorage, StorageAdapter, StorageError};
pub use crate::store::{ClientConfig, EntityRepository, OfflineClient, StoreError, StoreResult};

// Changelog:
// - v1.0.0 (2026-10-19): Initial library layout.
//   - Purpose: Establishes the library root for the offline data layer:
//     storage backends, the entity store, simulations, mining workflows and
//     the local HTTP API.
//   - Features: Re-exports the client, repository and storage types so
//     callers can open a store with a single import.
