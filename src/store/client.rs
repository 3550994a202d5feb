// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/client.rs
// Version: 1.0.0
//
// This file implements the offline client, the single entry point the CLI,
// the HTTP API and the mining workflows use. It owns the storage backend and
// the namespace, hands out entity repositories, and keeps the placeholder
// auth state and the capped application-usage log.
//
// Tree Location:
// - src/store/client.rs (offline client facade)
// - Depends on: storage, store/repository, store/seed

use super::error::StoreResult;
use super::repository::EntityRepository;
use super::seed::{User, ensure_seeded, new_id};
use crate::core::{EntityKind, now_iso};
use crate::storage::{
    DEFAULT_PREFIX, MemoryStorage, Namespace, StorageAdapter, read_json, write_json,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

static LOG_TARGET: &str = "cmo::client";

pub const DEFAULT_APP_LOG_CAP: usize = 500;
pub const DEFAULT_EMAIL_LOG_CAP: usize = 200;

/// Library-level configuration of the offline client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub prefix: String,
    pub app_log_cap: usize,
    pub email_log_cap: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            app_log_cap: DEFAULT_APP_LOG_CAP,
            email_log_cap: DEFAULT_EMAIL_LOG_CAP,
        }
    }
}

/// Acknowledgement returned by fire-and-forget calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLogEntry {
    pub id: String,
    pub page_name: String,
    pub timestamp: String,
}

pub struct OfflineClient {
    storage: Arc<dyn StorageAdapter>,
    namespace: Namespace,
    config: ClientConfig,
}

impl OfflineClient {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: ClientConfig) -> Self {
        let namespace = Namespace::new(config.prefix.clone());
        Self {
            storage,
            namespace,
            config,
        }
    }

    /// Client over a fresh in-memory store with the default configuration.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), ClientConfig::default())
    }

    pub fn storage(&self) -> &dyn StorageAdapter {
        self.storage.as_ref()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Repository for one entity collection.
    pub fn entities(&self, kind: EntityKind) -> EntityRepository {
        EntityRepository::new(self.storage.clone(), self.namespace.clone(), kind)
    }

    /// Write the starter data unless this namespace was seeded before.
    pub fn seed(&self) -> StoreResult<bool> {
        Ok(ensure_seeded(self.storage(), &self.namespace)?)
    }

    /// Current user. Falls back to the default account when nothing usable
    /// is stored, and writes it back when the stored value is JSON `null`.
    pub fn me(&self) -> StoreResult<User> {
        self.seed()?;
        let key = self.namespace.user_key();
        match read_json::<Value>(self.storage(), &key)? {
            None => Ok(User::default()),
            Some(Value::Null) => {
                let user = User::default();
                write_json(self.storage(), &key, &user)?;
                Ok(user)
            }
            Some(stored) => Ok(serde_json::from_value(stored).unwrap_or_default()),
        }
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.storage.remove(&self.namespace.token_key())?;
        self.storage.remove(&self.namespace.user_key())?;
        info!(target: LOG_TARGET, "👋 Signed out");
        Ok(())
    }

    /// Store the default account if no user is stored.
    pub fn ensure_user(&self) -> StoreResult<User> {
        let key = self.namespace.user_key();
        if self.storage.get(&key)?.is_none() {
            let user = User::default();
            write_json(self.storage(), &key, &user)?;
            return Ok(user);
        }
        self.me()
    }

    /// Record a page visit in the usage log, keeping the newest entries only.
    pub fn log_user_in_app(&self, page_name: &str) -> StoreResult<Ack> {
        let entry = AppLogEntry {
            id: new_id(),
            page_name: page_name.to_string(),
            timestamp: now_iso(),
        };
        let key = self.namespace.app_logs_key();
        prepend_capped(self.storage(), &key, serde_json::to_value(entry)?, self.config.app_log_cap)?;
        debug!(target: LOG_TARGET, "Logged visit to {}", page_name);
        Ok(Ack::OK)
    }

    /// Newest-first usage log.
    pub fn app_logs(&self) -> StoreResult<Vec<AppLogEntry>> {
        let entries: Vec<Value> =
            read_json(self.storage(), &self.namespace.app_logs_key())?.unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }
}

/// Push `entry` to the front of the JSON array under `key` and trim it to `cap`.
pub(crate) fn prepend_capped(
    storage: &dyn StorageAdapter,
    key: &str,
    entry: Value,
    cap: usize,
) -> StoreResult<()> {
    let mut entries: Vec<Value> = read_json(storage, key)?.unwrap_or_default();
    entries.insert(0, entry);
    entries.truncate(cap);
    write_json(storage, key, &entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_returns_seeded_user() {
        let client = OfflineClient::in_memory();
        assert_eq!(client.me().unwrap(), User::default());
    }

    #[test]
    fn me_repairs_null_user() {
        let client = OfflineClient::in_memory();
        client.seed().unwrap();
        client
            .storage()
            .set(&client.namespace().user_key(), "null")
            .unwrap();

        assert_eq!(client.me().unwrap(), User::default());
        let stored = client.storage().get(&client.namespace().user_key()).unwrap();
        assert!(stored.unwrap().contains("user-admin"));
    }

    #[test]
    fn logout_clears_user_and_token() {
        let client = OfflineClient::in_memory();
        client.seed().unwrap();
        client
            .storage()
            .set(&client.namespace().token_key(), "placeholder")
            .unwrap();

        client.logout().unwrap();
        assert!(client.storage().get(&client.namespace().user_key()).unwrap().is_none());
        assert!(client.storage().get(&client.namespace().token_key()).unwrap().is_none());

        // Logged out: the default account is reported but not written back.
        assert_eq!(client.me().unwrap(), User::default());
        assert!(client.storage().get(&client.namespace().user_key()).unwrap().is_none());

        client.ensure_user().unwrap();
        assert!(client.storage().get(&client.namespace().user_key()).unwrap().is_some());
    }

    #[test]
    fn app_log_is_capped_newest_first() {
        let config = ClientConfig {
            app_log_cap: 3,
            ..ClientConfig::default()
        };
        let client = OfflineClient::new(Arc::new(MemoryStorage::new()), config);
        for page in ["Dashboard", "Profiles", "Benchmarks", "AIModel", "CoinSwitch"] {
            assert_eq!(client.log_user_in_app(page).unwrap(), Ack::OK);
        }

        let pages: Vec<String> = client
            .app_logs()
            .unwrap()
            .into_iter()
            .map(|entry| entry.page_name)
            .collect();
        assert_eq!(pages, vec!["CoinSwitch", "AIModel", "Benchmarks"]);
    }
}
