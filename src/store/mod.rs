// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/mod.rs
// Version: 1.0.0
//
// This file declares the store module: the entity repository, the seed
// initializer and the offline client with its integration shims.
//
// Tree Location:
// - src/store/mod.rs (store module entry point)
// - Submodules: client, error, integrations, repository, seed

pub mod client;
pub mod error;
pub mod integrations;
pub mod repository;
pub mod seed;

pub use client::{
    Ack, AppLogEntry, ClientConfig, DEFAULT_APP_LOG_CAP, DEFAULT_EMAIL_LOG_CAP, OfflineClient,
};
pub use error::{StoreError, StoreResult};
pub use integrations::{EmailLogEntry, LlmResponse};
pub use repository::{Deleted, EntityRepository, into_record, record_id};
pub use seed::{User, ensure_seeded, is_seeded, new_id, starter_collections};
