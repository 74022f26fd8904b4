//! Integration tests for the startup sequence.

mod common;

use std::time::Duration;

use zipdrop_core::{Credentials, UploadRecord};
use zipdrop_history::{HISTORY_KEY, MemoryStore};
use zipdrop_remote::{Invocation, ScriptedBackend};
use zipdrop_settings::SettingsPhase;

fn persisted_record() -> UploadRecord {
    UploadRecord {
        id: "1700000000000-abcdef01".to_string(),
        display_name: "photo.webp".to_string(),
        human_size: "1.5 KB".to_string(),
        url: "https://cdn.example.test/u/photo.webp".to_string(),
        local_path: None,
        storage_key: Some("u/photo.webp".to_string()),
        is_local_only: false,
        created_at: 1_700_000_000_000,
    }
}

#[tokio::test(start_paused = true)]
async fn startup_sequence_tests_loads_history_then_remote_state() {
    let raw = serde_json::to_string(&vec![persisted_record()]).expect("record should encode");
    let store = MemoryStore::with_slot(HISTORY_KEY, &raw);
    let backend = ScriptedBackend::new();
    backend.seed_credentials(Credentials {
        access_key: "AKIA-TEST".to_string(),
        secret_key: "secret-test".to_string(),
        bucket_name: "drops".to_string(),
        account_id: "acc-123".to_string(),
        public_url_base: "https://pub-123.r2.dev".to_string(),
    });

    let mut runtime = common::runtime_with_store(&backend, store);
    assert_eq!(runtime.app().history().len(), 1);
    assert!(backend.invocations().is_empty());

    runtime.run_for(Duration::from_millis(10)).await;

    let calls = backend.invocations();
    assert!(calls.contains(&Invocation::ConfigStatus));
    assert!(calls.contains(&Invocation::SavedCredentials));

    let app = runtime.app();
    assert!(app.config().is_configured);
    assert_eq!(app.settings().phase(), SettingsPhase::Validated);
    assert_eq!(app.settings().draft().bucket_name, "drops");
    assert_eq!(app.ui_state().history[0].display_name, "photo.webp");
}

#[tokio::test(start_paused = true)]
async fn startup_sequence_tests_malformed_history_starts_empty() {
    let store = MemoryStore::with_slot(HISTORY_KEY, "{not json");
    let backend = ScriptedBackend::new();
    let mut runtime = common::runtime_with_store(&backend, store);
    runtime.run_for(Duration::from_millis(10)).await;

    assert!(runtime.app().history().is_empty());
    assert!(runtime.app().config().demo_mode);
}
