//! JSON storage with backup fallback.

use serde_json::json;
use spindle_std::storage::JsonStore;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_insert_persists_and_reloads() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path());

    let mut doc = store.map("server1", "roles").unwrap();
    assert!(doc.get("admin").is_none());
    doc.insert("admin", json!(["alice"])).unwrap();

    let reloaded = store.map("server1", "roles").unwrap();
    assert_eq!(reloaded.get("admin"), Some(&json!(["alice"])));
}

#[test]
fn test_backup_refreshed_before_write() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path());

    let mut doc = store.map("s", "counts").unwrap();
    doc.insert("a", 1).unwrap();
    doc.insert("a", 2).unwrap();

    let backup = fs::read_to_string(dir.path().join("s/backup/counts")).unwrap();
    let backup: serde_json::Value = serde_json::from_str(&backup).unwrap();
    assert_eq!(backup, json!({"a": 1}));
}

#[test]
fn test_corrupt_primary_falls_back_to_backup() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path());

    let mut doc = store.map("s", "counts").unwrap();
    doc.insert("a", 1).unwrap();
    doc.insert("b", 2).unwrap();
    fs::write(doc.path(), "{ not json").unwrap();

    let reloaded = store.map("s", "counts").unwrap();
    assert_eq!(reloaded.get("a"), Some(&json!(1)));
    assert!(reloaded.get("b").is_none());
}

#[test]
fn test_corrupt_primary_does_not_clobber_backup() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path());

    let mut doc = store.map("s", "counts").unwrap();
    doc.insert("a", 1).unwrap();
    doc.insert("a", 2).unwrap();
    fs::write(doc.path(), "garbage").unwrap();
    doc.insert("a", 3).unwrap();

    let backup = fs::read_to_string(dir.path().join("s/backup/counts")).unwrap();
    let backup: serde_json::Value = serde_json::from_str(&backup).unwrap();
    assert_eq!(backup, json!({"a": 1}));
}

#[test]
fn test_missing_everything_starts_empty() {
    let dir = TempDir::new().unwrap();
    let doc = JsonStore::new(dir.path()).map("s", "fresh").unwrap();
    assert!(doc.data().is_empty());
    assert!(dir.path().join("s/backup").is_dir());
}
