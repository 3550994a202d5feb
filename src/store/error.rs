// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/error.rs
// Version: 1.0.0
//
// Error type for the entity store and the workflows built on top of it.

use crate::core::{EntityKind, UnknownEntityError};
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage operation failed: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("Failed to encode record: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntityError),

    #[error("Record data must be a JSON object")]
    NotAnObject,

    #[error("{entity} record {id} not found")]
    RecordNotFound { entity: EntityKind, id: String },

    #[error("Not enough {entity} data: {found} records, at least {required} required")]
    InsufficientData {
        entity: EntityKind,
        required: usize,
        found: usize,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
