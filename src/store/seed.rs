// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/seed.rs
// Version: 1.0.0
//
// This file writes the starter data of a fresh namespace: two sample devices,
// one tuning profile, two sample coins, default user settings, empty
// collections for every other entity and the default user. A flag key makes
// the step run once per namespace.
//
// Tree Location:
// - src/store/seed.rs (seed initializer)
// - Depends on: serde, serde_json, uuid, storage

use crate::core::{EntityKind, Record, now_iso};
use crate::storage::{Namespace, StorageAdapter, StorageError, write_json};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

static LOG_TARGET: &str = "cmo::seed";

const SEEDED_FLAG: &str = "true";

/// Placeholder account of the offline build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: "user-admin".to_string(),
            name: "Offline Admin".to_string(),
            email: "admin@local".to_string(),
            role: "admin".to_string(),
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn is_seeded(storage: &dyn StorageAdapter, namespace: &Namespace) -> Result<bool, StorageError> {
    Ok(storage.get(&namespace.seeded_key())?.as_deref() == Some(SEEDED_FLAG))
}

/// Seed the namespace unless the flag is already set.
/// Returns `true` when this call wrote the starter data.
pub fn ensure_seeded(
    storage: &dyn StorageAdapter,
    namespace: &Namespace,
) -> Result<bool, StorageError> {
    if is_seeded(storage, namespace)? {
        return Ok(false);
    }

    let collections = starter_collections();
    let total: usize = collections.iter().map(|(_, records)| records.len()).sum();
    for (kind, records) in &collections {
        write_json(storage, &namespace.entity_key(*kind), records)?;
    }
    write_json(storage, &namespace.user_key(), &User::default())?;
    storage.set(&namespace.seeded_key(), SEEDED_FLAG)?;

    info!(target: LOG_TARGET, "🌱 Seeded namespace '{}' with {} starter records", namespace.prefix(), total);
    Ok(true)
}

/// Starter records for every entity, in `EntityKind::ALL` order.
pub fn starter_collections() -> Vec<(EntityKind, Vec<Record>)> {
    EntityKind::ALL
        .iter()
        .map(|kind| (*kind, starter_records(*kind)))
        .collect()
}

fn starter_records(kind: EntityKind) -> Vec<Record> {
    let now = now_iso();
    let bodies: Vec<Value> = match kind {
        EntityKind::Gpu => vec![
            json!({
                "gpu_id": "GPU-001",
                "name": "NVIDIA RTX 4090",
                "status": "active",
                "algorithm": "Ethash",
                "core_clock": 2500,
                "memory_clock": 10500,
                "power_limit": 70,
                "hashrate": 125.5,
                "power_draw": 270,
                "efficiency": 0.46,
                "temperature": 62,
                "fan_speed": 58,
                "last_updated": now
            }),
            json!({
                "gpu_id": "GPU-002",
                "name": "AMD RX 7900 XTX",
                "status": "active",
                "algorithm": "KawPow",
                "core_clock": 2350,
                "memory_clock": 9800,
                "power_limit": 75,
                "hashrate": 62.3,
                "power_draw": 220,
                "efficiency": 0.28,
                "temperature": 66,
                "fan_speed": 61,
                "last_updated": now
            }),
        ],
        EntityKind::GpuProfile => vec![json!({
            "name": "Efficiency Focus",
            "algorithm": "Ethash",
            "target_efficiency": 0.5,
            "core_clock": 2400,
            "memory_clock": 10200,
            "power_limit": 65
        })],
        EntityKind::CryptoCurrency => vec![
            json!({
                "name": "Ethereum Classic",
                "symbol": "ETC",
                "algorithm": "Ethash",
                "price_usd": 24.18,
                "price_change_24h": 1.2,
                "market_cap": 3_400_000_000u64,
                "daily_reward_per_mh": 0.00022
            }),
            json!({
                "name": "Ravencoin",
                "symbol": "RVN",
                "algorithm": "KawPow",
                "price_usd": 0.026,
                "price_change_24h": -0.5,
                "market_cap": 380_000_000u64,
                "daily_reward_per_mh": 0.0024
            }),
        ],
        EntityKind::UserSettings => vec![json!({
            "electricity_cost_per_kwh": 0.12,
            "target_temp": 70,
            "auto_optimize_interval": 30
        })],
        _ => Vec::new(),
    };

    bodies
        .into_iter()
        .filter_map(|body| match body {
            Value::Object(fields) => Some(stamp(fields, &now)),
            _ => None,
        })
        .collect()
}

fn stamp(fields: Record, now: &str) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), Value::String(new_id()));
    record.insert("created_date".to_string(), Value::String(now.to_string()));
    record.insert("updated_date".to_string(), Value::String(now.to_string()));
    record.extend(fields);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, read_json};

    #[test]
    fn seeds_once() {
        let storage = MemoryStorage::new();
        let ns = Namespace::default();

        assert!(!is_seeded(&storage, &ns).unwrap());
        assert!(ensure_seeded(&storage, &ns).unwrap());
        assert!(is_seeded(&storage, &ns).unwrap());
        assert!(!ensure_seeded(&storage, &ns).unwrap());

        let gpus: Vec<Record> = read_json(&storage, &ns.entity_key(EntityKind::Gpu))
            .unwrap()
            .unwrap();
        assert_eq!(gpus.len(), 2);
    }

    #[test]
    fn every_entity_gets_a_collection() {
        let storage = MemoryStorage::new();
        let ns = Namespace::new("t_");
        ensure_seeded(&storage, &ns).unwrap();

        for kind in EntityKind::ALL {
            let records: Option<Vec<Record>> =
                read_json(&storage, &ns.entity_key(kind)).unwrap();
            assert!(records.is_some(), "{} missing", kind);
        }
        let user: Option<User> = read_json(&storage, &ns.user_key()).unwrap();
        assert_eq!(user, Some(User::default()));
    }

    #[test]
    fn starter_records_are_stamped() {
        for (_, records) in starter_collections() {
            for record in records {
                assert!(!record["id"].as_str().unwrap().is_empty());
                assert_eq!(record["created_date"], record["updated_date"]);
            }
        }
    }

    #[test]
    fn starter_counts() {
        let counts: Vec<(EntityKind, usize)> = starter_collections()
            .into_iter()
            .map(|(kind, records)| (kind, records.len()))
            .filter(|(_, len)| *len > 0)
            .collect();
        assert_eq!(
            counts,
            vec![
                (EntityKind::Gpu, 2),
                (EntityKind::GpuProfile, 1),
                (EntityKind::CryptoCurrency, 2),
                (EntityKind::UserSettings, 1),
            ]
        );
    }
}
