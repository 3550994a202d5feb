// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for core functionality in cmo, located
// in the core subdirectory. It declares submodules for shared types, list
// ordering and timestamps.
//
// Tree Location:
// - src/core/mod.rs (core module entry point)
// - Submodules: types, sort, time

pub mod sort;
pub mod time;
pub mod types;

pub use sort::{SortKey, SortSpec};
pub use time::{now_iso, parse_timestamp_millis};
pub use types::{Args, ClockSettings, Command, EntityKind, Record, UnknownEntityError};
