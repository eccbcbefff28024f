//! Tests for Database
//!
//! These tests verify:
//! - Lazy, case-insensitive collection creation
//! - Discovery of existing collection files on open
//! - Listing and dropping collections
//! - Command execution results

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;
use slatekv::database::CollectionSummary;
use slatekv::protocol::Command;
use slatekv::{Config, Database, SlateError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open_path(temp_dir.path()).unwrap();
    (temp_dir, db)
}

/// Drop "x" while its old handle is locked, recreate it from a third thread,
/// then check that the write made through the new collection survives reopen
fn drop_then_recreate(drop_x: fn(&Database)) {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(Database::open_path(temp_dir.path()).unwrap());
    set(&db, "x", "old", json!(1));

    let old = db.collection("x").unwrap();
    let guard = old.lock();

    let dropper = {
        let db = Arc::clone(&db);
        thread::spawn(move || drop_x(&*db))
    };
    thread::sleep(Duration::from_millis(100));

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let handle = db.collection("x").unwrap();
            let mut collection = handle.lock();
            collection.set("new", &json!(2)).unwrap();
        })
    };
    thread::sleep(Duration::from_millis(100));

    drop(guard);
    dropper.join().unwrap();
    writer.join().unwrap();

    assert!(temp_dir.path().join("x.dat").exists());

    let reopened = Database::open_path(temp_dir.path()).unwrap();
    let handle = reopened.collection("x").unwrap();
    let mut collection = handle.lock();
    assert_eq!(collection.get("new").unwrap(), Some(json!({ "new": 2 })));
    assert_eq!(collection.get("old").unwrap(), None);
}

fn set(db: &Database, collection: &str, key: &str, value: serde_json::Value) {
    db.execute(Command::Set {
        collection: collection.to_string(),
        key: key.to_string(),
        value,
    })
    .unwrap();
}

// =============================================================================
// Collection Registry
// =============================================================================

#[test]
fn test_open_creates_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("data");

    let db = Database::open_path(&data_dir).unwrap();
    assert!(data_dir.is_dir());
    assert!(db.collection_names().is_empty());
}

#[test]
fn test_collection_created_lazily() {
    let (temp, db) = setup_temp_db();

    assert!(!db.contains("users"));
    db.collection("users").unwrap();

    assert!(db.contains("users"));
    assert!(temp.path().join("users.dat").exists());
}

#[test]
fn test_collection_names_are_case_insensitive() {
    let (temp, db) = setup_temp_db();

    let upper = db.collection("Users").unwrap();
    let lower = db.collection("users").unwrap();

    assert!(Arc::ptr_eq(&upper, &lower));
    assert_eq!(db.collection_names(), vec!["users".to_string()]);
    assert_eq!(db.collection_path("Users"), temp.path().join("users.dat"));
}

#[test]
fn test_invalid_collection_name() {
    let (_temp, db) = setup_temp_db();

    for name in ["", "../escape", "a/b", "with space", "dot.ted"] {
        assert!(
            matches!(
                db.collection(name),
                Err(SlateError::InvalidCollectionName(_))
            ),
            "name {:?} should be rejected",
            name
        );
    }
}

#[test]
fn test_concurrent_creation_yields_one_collection() {
    let (_temp, db) = setup_temp_db();
    let db = Arc::new(db);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                let handle = db.collection("shared").unwrap();
                handle
                    .lock()
                    .set(&format!("k{}", i), &json!(i))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.collection_names(), vec!["shared".to_string()]);
    assert_eq!(db.collection("shared").unwrap().lock().len(), 8);
}

#[test]
fn test_reopen_discovers_collections() {
    let temp_dir = TempDir::new().unwrap();
    {
        let db = Database::open_path(temp_dir.path()).unwrap();
        set(&db, "users", "alice", json!(1));
        set(&db, "orders", "o1", json!({ "total": 9.5 }));
    }
    // Files that are not collection logs are ignored
    std::fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

    let db = Database::open_path(temp_dir.path()).unwrap();
    assert_eq!(
        db.collection_names(),
        vec!["orders".to_string(), "users".to_string()]
    );

    let value = db
        .execute(Command::Get {
            collection: "users".to_string(),
            key: "alice".to_string(),
        })
        .unwrap();
    assert_eq!(value, json!({ "alice": 1 }));
}

#[test]
fn test_custom_file_extension() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .file_extension("kv")
        .build();

    let db = Database::open(config).unwrap();
    db.collection("items").unwrap();
    assert!(temp_dir.path().join("items.kv").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .file_extension(".dat")
        .build();

    assert!(matches!(Database::open(config), Err(SlateError::Config(_))));
}

// =============================================================================
// List / Drop
// =============================================================================

#[test]
fn test_list() {
    let (_temp, db) = setup_temp_db();

    set(&db, "b", "k", json!(1));
    set(&db, "a", "x", json!("y"));
    set(&db, "a", "z", json!("w"));

    let list = db.list().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(
        list[0],
        CollectionSummary {
            name: "a".to_string(),
            count: 2,
            size: 2 * (8 + 1 + 3),
        }
    );
    assert_eq!(list[1].name, "b");
    assert_eq!(list[1].count, 1);
}

#[test]
fn test_drop_collection() {
    let (temp, db) = setup_temp_db();
    set(&db, "users", "alice", json!(1));
    let handle = db.collection("users").unwrap();

    db.drop_collection("USERS").unwrap();

    assert!(!db.contains("users"));
    assert!(!temp.path().join("users.dat").exists());
    // Outstanding handles see the dropped state
    assert!(matches!(
        handle.lock().get("alice"),
        Err(SlateError::CollectionDropped(_))
    ));
    assert!(matches!(
        db.drop_collection("users"),
        Err(SlateError::CollectionNotFound(_))
    ));
}

#[test]
fn test_collection_recreated_after_drop_is_empty() {
    let (_temp, db) = setup_temp_db();
    set(&db, "users", "alice", json!(1));
    db.drop_collection("users").unwrap();

    let handle = db.collection("users").unwrap();
    assert!(handle.lock().is_empty());
}

#[test]
fn test_drop_all() {
    let (temp, db) = setup_temp_db();
    set(&db, "a", "k", json!(1));
    set(&db, "b", "k", json!(2));
    set(&db, "c", "k", json!(3));

    assert_eq!(db.drop_all().unwrap(), 3);
    assert!(db.collection_names().is_empty());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_drop_does_not_delete_recreated_collection() {
    drop_then_recreate(|db| db.drop_collection("x").unwrap());
}

#[test]
fn test_drop_all_does_not_delete_recreated_collection() {
    drop_then_recreate(|db| assert_eq!(db.drop_all().unwrap(), 1));
}

// =============================================================================
// Command Execution
// =============================================================================

#[test]
fn test_execute_results() {
    let (_temp, db) = setup_temp_db();

    assert_eq!(db.execute(Command::Ping).unwrap(), json!("pong"));

    set(&db, "users", "alice", json!({ "age": 30 }));
    set(&db, "users", "bob", json!({ "age": 25 }));

    let count = db
        .execute(Command::Count {
            collection: "users".to_string(),
            pattern: Some("^a".to_string()),
            exact: false,
        })
        .unwrap();
    assert_eq!(count, json!(1));

    let query = db
        .execute(Command::Query {
            collection: "users".to_string(),
            pattern: "b".to_string(),
        })
        .unwrap();
    assert_eq!(query, json!([{ "bob": { "age": 25 } }]));

    let info = db
        .execute(Command::Info {
            collection: "users".to_string(),
        })
        .unwrap();
    assert_eq!(info["count"], json!(2));

    let listing = db.execute(Command::ListCollections).unwrap();
    assert_eq!(listing[0]["name"], json!("users"));
}

#[test]
fn test_execute_missing_key() {
    let (_temp, db) = setup_temp_db();

    let get = db.execute(Command::Get {
        collection: "users".to_string(),
        key: "ghost".to_string(),
    });
    assert!(matches!(get, Err(SlateError::KeyNotFound)));

    let remove = db.execute(Command::Remove {
        collection: "users".to_string(),
        key: "ghost".to_string(),
    });
    assert!(matches!(remove, Err(SlateError::KeyNotFound)));
}

#[test]
fn test_execute_truncate_and_drop() {
    let (_temp, db) = setup_temp_db();
    set(&db, "tmp", "k", json!(1));

    let truncated = db
        .execute(Command::Truncate {
            collection: "tmp".to_string(),
        })
        .unwrap();
    assert_eq!(truncated, json!(true));

    let dropped = db
        .execute(Command::Drop {
            collection: "tmp".to_string(),
        })
        .unwrap();
    assert_eq!(dropped, json!(true));
    assert!(!db.contains("tmp"));
}
