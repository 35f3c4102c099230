//! End-to-end tests of the public `Store` API.

use serde_json::{json, Value};
use snapkv::{Store, StoreConfig, StoreError};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn snapshot_json(path: &std::path::Path) -> HashMap<String, Value> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_snapshot_round_trip_with_mixed_ttls() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("datastore.json");

    {
        let store = assert_ok!(Store::open_path(&path));
        assert_ok!(store.create("forever", json!({"name": "Alice"}), 0));
        assert_ok!(store.create("hour", json!({"name": "Bob"}), 3600));
        assert_ok!(store.create("brief", json!({"name": "Eve"}), 1));
        assert_ok!(store.batch_create(
            vec![
                ("list".to_string(), json!([1, "two", null, 4.5])),
                ("flag".to_string(), json!(true)),
            ],
            0,
        ));
        assert_ok!(store.close());
    }

    // Let "brief" expire while the store is closed
    tokio::time::sleep(Duration::from_millis(2100)).await;

    let store = assert_ok!(Store::open_path(&path));
    assert_eq!(store.read("forever").unwrap(), json!({"name": "Alice"}));
    assert_eq!(store.read("hour").unwrap(), json!({"name": "Bob"}));
    assert_eq!(store.read("list").unwrap(), json!([1, "two", null, 4.5]));
    assert_eq!(store.read("flag").unwrap(), json!(true));

    // Expired entries survive a load and expire on first read
    assert!(matches!(store.read("brief"), Err(StoreError::KeyExpired(_))));
    assert!(matches!(store.read("brief"), Err(StoreError::KeyNotFound(_))));
}

#[tokio::test]
async fn test_snapshot_file_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("datastore.json");

    let store = Store::open_path(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

    store.create("key1", json!({"name": "Alice"}), 60).unwrap();
    store.create("key2", json!({"name": "Bob"}), 0).unwrap();

    let snapshot = snapshot_json(&path);
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["key1"]["value"], json!({"name": "Alice"}));
    assert!(snapshot["key1"]["ttl"].as_u64().unwrap() > 0);
    assert_eq!(snapshot["key2"], json!({"value": {"name": "Bob"}, "ttl": 0}));

    store.remove("key1").unwrap();
    store.remove("key2").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}

#[tokio::test]
async fn test_validation_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = Store::open_path(dir.path().join("db.json")).unwrap();
    store.create("existing", json!(1), 0).unwrap();
    let persists = store.stats().persists;

    let failures = [
        store.create(&"k".repeat(33), json!(1), 0),
        store.create("big", json!("x".repeat(16 * 1024)), 0),
        store.create("existing", json!(2), 0),
        store.batch_create((0..101).map(|i| (format!("k{}", i), json!(i))).collect(), 0),
        store.batch_create(
            vec![("fresh".to_string(), json!(1)), ("existing".to_string(), json!(2))],
            0,
        ),
    ];
    for result in failures {
        let err = assert_err!(result);
        assert!(err.is_validation(), "{} should be a validation error", err);
    }

    assert_eq!(store.keys(), vec!["existing".to_string()]);
    assert_eq!(store.read("existing").unwrap(), json!(1));
    assert_eq!(store.stats().persists, persists);
}

#[tokio::test]
async fn test_remove_twice() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::open_path(&path).unwrap();

    store.create("key", json!("value"), 0).unwrap();
    assert_ok!(store.remove("key"));
    assert!(matches!(store.remove("key"), Err(StoreError::KeyNotFound(_))));
    drop(store);

    let store = Store::open_path(&path).unwrap();
    assert!(store.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_and_readers() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open_path(dir.path().join("db.json")).unwrap());
    let expected = |w: usize, i: usize| json!({"writer": w, "seq": i, "pad": "x".repeat(256)});

    let mut tasks = Vec::new();
    for w in 0..4 {
        let store = Arc::clone(&store);
        tasks.push(tokio::task::spawn_blocking(move || {
            for i in 0..20 {
                store.create(&format!("w{}:{}", w, i), expected(w, i), 0).unwrap();
            }
        }));
    }
    for r in 0..4 {
        let store = Arc::clone(&store);
        tasks.push(tokio::task::spawn_blocking(move || {
            for n in 0..200 {
                let (w, i) = ((n + r) % 4, n % 20);
                match store.read(&format!("w{}:{}", w, i)) {
                    Ok(value) => assert_eq!(value, expected(w, i)),
                    Err(StoreError::KeyNotFound(_)) => {}
                    Err(e) => panic!("torn or unexpected read: {}", e),
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len(), 80);
    assert_eq!(snapshot_json(store.engine().path()).len(), 80);
}

#[tokio::test]
async fn test_sweeper_persists_removals() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let config = StoreConfig::default()
        .with_path(&path)
        .with_sweep_interval(Duration::from_millis(100));

    let store = Store::open(config).unwrap();
    store
        .batch_create(
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))],
            1,
        )
        .unwrap();
    store.create("keep", json!(3), 0).unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let snapshot = snapshot_json(&path);
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains_key("keep"));
    assert_eq!(store.stats().expired, 2);
}
