// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/file_storage_test.rs
// Version: 1.0.0
//
// This file contains tests for the file-backed storage: key layout on disk,
// atomic writes, persistence across reopen, key validation and error cases.

#[cfg(test)]
mod tests {
    use cmo::core::EntityKind;
    use cmo::storage::{FileStorage, StorageAdapter, StorageError};
    use cmo::store::{ClientConfig, OfflineClient, into_record, record_id};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    // Helper function to create a temporary directory for testing
    fn create_temp_dir() -> TempDir {
        tempdir().expect("Failed to create temporary directory")
    }

    fn open_client(dir: &TempDir) -> OfflineClient {
        let storage = FileStorage::new(dir.path().to_path_buf()).expect("Failed to open storage");
        OfflineClient::new(Arc::new(storage), ClientConfig::default())
    }

    #[test]
    fn test_set_get_remove() {
        let dir = create_temp_dir();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(storage.get("cmo_token").unwrap(), None);
        storage.set("cmo_token", "abc").unwrap();
        assert_eq!(storage.get("cmo_token").unwrap().as_deref(), Some("abc"));
        assert!(dir.path().join("cmo_token.json").exists());

        storage.remove("cmo_token").unwrap();
        assert_eq!(storage.get("cmo_token").unwrap(), None);
        // removing twice is fine
        storage.remove("cmo_token").unwrap();
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let dir = create_temp_dir();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("cmo_seeded", "false").unwrap();
        storage.set("cmo_seeded", "true").unwrap();

        assert_eq!(storage.get("cmo_seeded").unwrap().as_deref(), Some("true"));
        assert!(!dir.path().join("cmo_seeded.tmp").exists());
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_concurrent_writers_to_one_key() {
        let dir = create_temp_dir();
        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    let payload = format!("[{{\"worker\":{}}}]", worker);
                    (0..100)
                        .filter(|_| storage.set("cmo_entity_GPU", &payload).is_err())
                        .count()
                })
            })
            .collect();

        let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(failures, 0);

        let stored = storage.get("cmo_entity_GPU").unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert!(parsed[0]["worker"].is_number());
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let dir = create_temp_dir();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden", "spaced key"] {
            assert!(
                matches!(storage.set(key, "x"), Err(StorageError::InvalidKey { .. })),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_missing_directory_rejected() {
        let dir = create_temp_dir();
        let missing = dir.path().join("nope");
        assert!(matches!(
            FileStorage::new(missing),
            Err(StorageError::NotADirectory { .. })
        ));

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            FileStorage::new(file),
            Err(StorageError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = create_temp_dir();
        let created = {
            let client = open_client(&dir);
            client
                .entities(EntityKind::Gpu)
                .create(into_record(json!({"gpu_id": "GPU-003", "name": "Test"})).unwrap())
                .unwrap()
        };

        let reopened = open_client(&dir);
        let gpus = reopened.entities(EntityKind::Gpu).list(None, None).unwrap();
        assert_eq!(gpus.len(), 3);
        assert_eq!(record_id(&gpus[0]), record_id(&created));
        // the seed flag persisted too, so reopening did not reseed
        assert!(!reopened.seed().unwrap());
    }

    #[test]
    fn test_on_disk_layout() {
        let dir = create_temp_dir();
        let client = open_client(&dir);
        client.seed().unwrap();

        for kind in EntityKind::ALL {
            let path = dir.path().join(format!("cmo_entity_{}.json", kind.as_str()));
            assert!(path.exists(), "missing {:?}", path);
        }
        assert!(dir.path().join("cmo_user.json").exists());

        let raw = std::fs::read_to_string(dir.path().join("cmo_seeded.json")).unwrap();
        assert_eq!(raw, "true");
    }

    #[test]
    fn test_corrupt_file_lists_empty() {
        let dir = create_temp_dir();
        let client = open_client(&dir);
        client.seed().unwrap();

        std::fs::write(dir.path().join("cmo_entity_GPU.json"), "{not json").unwrap();
        assert!(client.entities(EntityKind::Gpu).list(None, None).unwrap().is_empty());

        // the next write replaces the corrupt collection
        client
            .entities(EntityKind::Gpu)
            .create(into_record(json!({"gpu_id": "GPU-010"})).unwrap())
            .unwrap();
        assert_eq!(client.entities(EntityKind::Gpu).list(None, None).unwrap().len(), 1);
    }
}
