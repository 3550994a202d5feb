// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/storage/namespace.rs
// Version: 1.0.0
//
// Storage key layout. Every key the store touches is built here from the
// namespace prefix.
//
// Tree Location:
// - src/storage/namespace.rs (key layout)
// - Depends on: core/types

use crate::core::EntityKind;

pub const DEFAULT_PREFIX: &str = "cmo_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>entity_<Entity>`
    pub fn entity_key(&self, kind: EntityKind) -> String {
        format!("{}entity_{}", self.prefix, kind.as_str())
    }

    pub fn seeded_key(&self) -> String {
        format!("{}seeded", self.prefix)
    }

    pub fn user_key(&self) -> String {
        format!("{}user", self.prefix)
    }

    pub fn token_key(&self) -> String {
        format!("{}token", self.prefix)
    }

    pub fn app_logs_key(&self) -> String {
        format!("{}app_logs", self.prefix)
    }

    pub fn email_log_key(&self) -> String {
        format!("{}email_log", self.prefix)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
