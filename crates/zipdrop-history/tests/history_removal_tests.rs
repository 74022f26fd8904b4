//! Integration tests for record removal and remote deletion requests.

mod common;

use zipdrop_history::{HISTORY_KEY, HistoryStore, MemoryStore, RemoteDeletion};

#[test]
fn history_removal_tests_rewrites_slot_without_record() {
    let store = MemoryStore::new();
    let mut history = HistoryStore::load(store.clone());
    history.prepend(common::cloud_record(1)).expect("prepend");
    history.prepend(common::cloud_record(2)).expect("prepend");

    let removal = history
        .remove("1-cloud", RemoteDeletion::Keep)
        .expect("remove should persist")
        .expect("record should exist");

    assert_eq!(removal.record.created_at, 1);
    assert_eq!(removal.delete_storage_key, None);
    let raw = store.raw(HISTORY_KEY).expect("slot should exist");
    assert!(!raw.contains("1-cloud"));
    assert!(raw.contains("2-cloud"));
}

#[test]
fn history_removal_tests_requests_delete_only_for_cloud_records() {
    let mut history = HistoryStore::load(MemoryStore::new());
    history.prepend(common::cloud_record(1)).expect("prepend");
    history.prepend(common::local_record(2)).expect("prepend");

    let cloud = history
        .remove("1-cloud", RemoteDeletion::Request)
        .expect("remove")
        .expect("record should exist");
    let local = history
        .remove("2-local", RemoteDeletion::Request)
        .expect("remove")
        .expect("record should exist");

    assert_eq!(cloud.delete_storage_key.as_deref(), Some("u/1.webp"));
    assert_eq!(local.delete_storage_key, None);
    assert!(history.is_empty());
}

#[test]
fn history_removal_tests_unknown_id_is_noop() {
    let mut history = HistoryStore::load(MemoryStore::new());
    history.prepend(common::local_record(1)).expect("prepend");

    assert_eq!(history.remove("missing", RemoteDeletion::Request).expect("remove"), None);
    assert_eq!(history.len(), 1);
}
