//! Integration tests for configuration-driven history on disk.

use std::fs;

use zipdrop_app::{AppConfig, DATA_DIR_ENV, Timings, open_app};
use zipdrop_history::HISTORY_KEY;

#[test]
fn file_history_tests_open_app_reads_persisted_slot() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let raw = r#"[{"id":"1-a","displayName":"a.webp","humanSize":"2.0 KB","url":"https://cdn.example.test/a.webp","storageKey":"a.webp","isLocalOnly":false,"createdAt":1}]"#;
    fs::write(dir.path().join(format!("{HISTORY_KEY}.json")), raw).expect("slot should be written");

    let data_dir = dir.path().to_string_lossy().into_owned();
    let config = AppConfig::from_lookup(|name| (name == DATA_DIR_ENV).then(|| data_dir.clone()))
        .expect("config should resolve");
    assert_eq!(config.data_dir, dir.path());

    let app = open_app(&config.data_dir, Timings::default());
    let state = app.ui_state();
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].display_name, "a.webp");
    assert!(state.window_visible);
}
