//! Shared fixtures for app integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use zipdrop_app::{App, Clock, Runtime, Timings, WindowCommand};
use zipdrop_core::{ConfigStatus, ProcessOutcome};
use zipdrop_history::{HistoryStore, MemoryStore};
use zipdrop_remote::{RemoteBackend, ScriptedBackend};

/// Fixed Unix time the test clock starts at.
pub const START_MS: u64 = 1_700_000_000_000;

/// Runtime over an empty in-memory history.
pub fn runtime(backend: &ScriptedBackend) -> Runtime<MemoryStore> {
    runtime_with_store(backend, MemoryStore::new())
}

/// Runtime over a caller-provided history slot. Window requests are dropped.
pub fn runtime_with_store(backend: &ScriptedBackend, store: MemoryStore) -> Runtime<MemoryStore> {
    let (window_tx, _) = mpsc::unbounded_channel();
    build(backend, store, window_tx)
}

/// Runtime over an empty history plus the receiving end of its window
/// requests.
pub fn runtime_with_window(
    backend: &ScriptedBackend,
) -> (Runtime<MemoryStore>, UnboundedReceiver<WindowCommand>) {
    let (window_tx, window_rx) = mpsc::unbounded_channel();
    (build(backend, MemoryStore::new(), window_tx), window_rx)
}

/// Drains every window request delivered so far.
pub fn drain_window(window: &mut UnboundedReceiver<WindowCommand>) -> Vec<WindowCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = window.try_recv() {
        commands.push(command);
    }
    commands
}

fn build(
    backend: &ScriptedBackend,
    store: MemoryStore,
    window_tx: mpsc::UnboundedSender<WindowCommand>,
) -> Runtime<MemoryStore> {
    let app = App::new(HistoryStore::load(store), Timings::default(), "test");
    let backend: Arc<dyn RemoteBackend> = Arc::new(backend.clone());
    Runtime::new(app, backend, window_tx, Clock::starting_at(START_MS))
}

/// Backend reporting configured cloud storage, outside demo mode.
pub fn cloud_backend() -> ScriptedBackend {
    let backend = ScriptedBackend::new();
    backend.set_status(ConfigStatus {
        is_configured: true,
        demo_mode: false,
        bucket_name: Some("drops".to_string()),
    });
    backend
}

/// Cloud upload result for a file named `stem.file_type`.
pub fn cloud_outcome(stem: &str, file_type: &str) -> ProcessOutcome {
    ProcessOutcome {
        url: format!("https://cdn.example.test/u/{stem}.{file_type}"),
        local_path: None,
        storage_key: Some(format!("u/{stem}.{file_type}")),
        original_size: 4_096,
        processed_size: 1_536,
        file_type: file_type.to_string(),
        is_demo: false,
    }
}

/// Demo-mode result saved next to the user's files.
pub fn demo_outcome(stem: &str, file_type: &str) -> ProcessOutcome {
    let local_path = format!("/home/u/ZipDrop/{stem}.{file_type}");
    ProcessOutcome {
        url: format!("file://{local_path}"),
        local_path: Some(local_path),
        storage_key: None,
        original_size: 4_096,
        processed_size: 512,
        file_type: file_type.to_string(),
        is_demo: true,
    }
}
