//! Integration tests for the file-backed key-value store.

mod common;

use zipdrop_history::{FileStore, HISTORY_KEY, HistoryStore, KeyValueStore};

#[test]
fn file_store_tests_missing_slot_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("nested"));
    assert_eq!(store.load(HISTORY_KEY).expect("load"), None);
}

#[test]
fn file_store_tests_history_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let mut history = HistoryStore::load(FileStore::new(dir.path()));
        history.prepend(common::cloud_record(7)).expect("prepend");
    }

    let history = HistoryStore::load(FileStore::new(dir.path()));
    assert_eq!(history.len(), 1);
    assert_eq!(history.all()[0].id, "7-cloud");
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 1);
}

#[test]
fn file_store_tests_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("zipdrop-history.json"), b"\xff\xfe garbage")
        .expect("write corrupt slot");

    let history = HistoryStore::load(FileStore::new(dir.path()));
    assert!(history.is_empty());
}

#[test]
fn file_store_tests_failed_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocked = dir.path().join("zipdrop-history.json");
    std::fs::create_dir(&blocked).expect("block slot with a directory");
    std::fs::write(blocked.join("keep"), b"x").expect("fill blocking directory");

    let store = FileStore::new(dir.path());
    assert!(store.save(HISTORY_KEY, "[]").is_err());

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("zipdrop-history.json")]);
}
