// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/repository.rs
// Version: 1.0.0
//
// This file implements CRUD over one entity collection. The collection is a
// JSON array under a single storage key; reads parse the whole array, writes
// replace it. New records go to the front so an unsorted list is
// newest-first.
//
// Tree Location:
// - src/store/repository.rs (entity repository)
// - Depends on: serde_json, storage, core/sort, store/seed

use super::error::{StoreError, StoreResult};
use super::seed::{ensure_seeded, new_id};
use crate::core::{EntityKind, Record, SortSpec, now_iso};
use crate::storage::{Namespace, StorageAdapter, read_json, write_json};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

static LOG_TARGET: &str = "cmo::repository";

/// Result of a delete call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

/// CRUD handle for one entity collection
#[derive(Clone)]
pub struct EntityRepository {
    storage: Arc<dyn StorageAdapter>,
    namespace: Namespace,
    kind: EntityKind,
    key: String,
}

impl EntityRepository {
    pub fn new(storage: Arc<dyn StorageAdapter>, namespace: Namespace, kind: EntityKind) -> Self {
        let key = namespace.entity_key(kind);
        Self {
            storage,
            namespace,
            kind,
            key,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Read the collection, seeding the namespace first when needed.
    /// An unreadable collection reads as empty.
    fn load(&self) -> StoreResult<Vec<Record>> {
        ensure_seeded(self.storage.as_ref(), &self.namespace)?;

        let Some(items) = read_json::<Vec<Value>>(self.storage.as_ref(), &self.key)? else {
            return Ok(Vec::new());
        };
        let total = items.len();
        let records: Vec<Record> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect();
        if records.len() != total {
            warn!(target: LOG_TARGET, "Dropped {} non-object entries from {}", total - records.len(), self.kind);
        }
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StoreResult<()> {
        write_json(self.storage.as_ref(), &self.key, records)?;
        debug!(target: LOG_TARGET, "Saved {} {} records", records.len(), self.kind);
        Ok(())
    }

    /// All records, optionally sorted by `sort` (`field` or `-field`) and
    /// truncated to `limit`.
    pub fn list(&self, sort: Option<&str>, limit: Option<usize>) -> StoreResult<Vec<Record>> {
        let mut records = self.load()?;
        if let Some(spec) = sort.and_then(SortSpec::parse) {
            spec.sort(&mut records);
        }
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.load()?.into_iter().find(|record| has_id(record, id)))
    }

    /// Records whose top-level `field` equals `value`.
    pub fn filter(&self, field: &str, value: &Value) -> StoreResult<Vec<Record>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|record| record.get(field) == Some(value))
            .collect())
    }

    /// Store a new record at the front of the collection.
    ///
    /// `id` and `created_date` are taken from `data` when present and
    /// non-null; `updated_date` is always the current time. A non-string
    /// `id` is stored in its JSON text form (`42` becomes `"42"`).
    pub fn create(&self, data: Record) -> StoreResult<Record> {
        let mut records = self.load()?;
        let now = now_iso();

        let id = match non_null(&data, "id") {
            Some(Value::String(id)) => Value::String(id),
            Some(other) => Value::String(other.to_string()),
            None => Value::String(new_id()),
        };
        let created = non_null(&data, "created_date").unwrap_or_else(|| Value::String(now.clone()));
        let record = stamped(id, created, now, data);

        records.insert(0, record.clone());
        self.save(&records)?;
        debug!(target: LOG_TARGET, "Created {} {}", self.kind, display_id(&record));
        Ok(record)
    }

    /// Merge `data` onto the record with `id`.
    ///
    /// `id` and `created_date` of an existing record never change. When no
    /// record has this id, a new one is created under it.
    pub fn update(&self, id: &str, data: Record) -> StoreResult<Record> {
        let mut records = self.load()?;
        let now = now_iso();

        let Some(index) = records.iter().position(|record| has_id(record, id)) else {
            let created =
                non_null(&data, "created_date").unwrap_or_else(|| Value::String(now.clone()));
            let record = stamped(Value::String(id.to_string()), created, now, data);
            records.insert(0, record.clone());
            self.save(&records)?;
            debug!(target: LOG_TARGET, "Upserted missing {} {}", self.kind, id);
            return Ok(record);
        };

        let merged = &mut records[index];
        for (field, value) in data {
            if matches!(field.as_str(), "id" | "created_date" | "updated_date") {
                continue;
            }
            merged.insert(field, value);
        }
        merged.insert("updated_date".to_string(), Value::String(now));
        let updated = merged.clone();

        self.save(&records)?;
        debug!(target: LOG_TARGET, "Updated {} {}", self.kind, id);
        Ok(updated)
    }

    /// Remove the record with `id`. Removing an unknown id succeeds.
    pub fn delete(&self, id: &str) -> StoreResult<Deleted> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|record| !has_id(record, id));
        if records.len() != before {
            self.save(&records)?;
            debug!(target: LOG_TARGET, "Deleted {} {}", self.kind, id);
        }
        Ok(Deleted { id: id.to_string() })
    }

    /// Like `update`, but fails when the record does not exist.
    pub fn update_existing(&self, id: &str, data: Record) -> StoreResult<Record> {
        if self.get(id)?.is_none() {
            return Err(StoreError::RecordNotFound {
                entity: self.kind,
                id: id.to_string(),
            });
        }
        self.update(id, data)
    }
}

pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Whether `record` is addressed by `id`. Ids stored as other JSON values
/// (written before ids were normalized) match on their text form.
fn has_id(record: &Record, id: &str) -> bool {
    match record.get("id") {
        Some(Value::String(stored)) => stored == id,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == id,
    }
}

/// Convert a JSON value into a record, rejecting non-objects.
pub fn into_record(value: Value) -> StoreResult<Record> {
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(StoreError::NotAnObject),
    }
}

fn non_null(data: &Record, field: &str) -> Option<Value> {
    data.get(field).filter(|value| !value.is_null()).cloned()
}

fn stamped(id: Value, created: Value, now: String, data: Record) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), id);
    record.insert("created_date".to_string(), created);
    record.insert("updated_date".to_string(), Value::String(now));
    for (field, value) in data {
        if matches!(field.as_str(), "id" | "created_date" | "updated_date") {
            continue;
        }
        record.insert(field, value);
    }
    record
}

fn display_id(record: &Record) -> String {
    match record.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<no id>".to_string(),
    }
}
