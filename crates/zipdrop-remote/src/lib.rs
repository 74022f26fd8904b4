#![warn(missing_docs)]
//! # zipdrop-remote
//!
//! ## Purpose
//! Defines the opaque remote-invocation boundary the orchestration layer uses
//! for processing, uploading, credential storage, and desktop integration.
//!
//! ## Responsibilities
//! - Describe every remote operation as one async trait, [`RemoteBackend`].
//! - Carry remote failures as a message-only [`RemoteError`].
//! - Provide [`ScriptedBackend`], a deterministic backend for tests and CI.
//!
//! ## Data flow
//! The app event loop spawns one task per remote call, awaits the backend, and
//! posts the settlement back into the loop as an event.
//!
//! ## Ownership and lifetimes
//! Inputs are passed as owned values so spawned tasks never borrow loop state.
//!
//! ## Error model
//! Remote failures carry no structure beyond their message; callers convert
//! them into transient UI state at the call site.
//!
//! ## Security and privacy notes
//! Credentials cross this boundary but are never logged here; their `Debug`
//! output is redacted by `zipdrop-core`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use zipdrop_core::{ConfigStatus, Credentials, ProcessOutcome};

/// Failure reported by any remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    /// Creates a remote error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Abstract remote boundary used by the orchestration layer.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Returns the current server-side configuration.
    async fn config_status(&self) -> Result<ConfigStatus, RemoteError>;

    /// Processes and uploads (or saves locally) an ordered batch of paths.
    async fn process_and_upload(&self, paths: Vec<String>) -> Result<ProcessOutcome, RemoteError>;

    /// Copies text to the system clipboard.
    async fn copy_to_clipboard(&self, text: String) -> Result<(), RemoteError>;

    /// Reveals a path in the platform file manager.
    async fn reveal_path(&self, path: String) -> Result<(), RemoteError>;

    /// Opens a URL in the default browser.
    async fn open_url(&self, url: String) -> Result<(), RemoteError>;

    /// Deletes a stored cloud object. Callers discard the result.
    async fn delete_object(&self, storage_key: String) -> Result<(), RemoteError>;

    /// Returns previously saved credentials, if any.
    async fn saved_credentials(&self) -> Result<Option<Credentials>, RemoteError>;

    /// Checks credentials against the storage provider.
    async fn validate_credentials(&self, credentials: Credentials) -> Result<(), RemoteError>;

    /// Persists credentials in secure storage.
    async fn save_credentials(&self, credentials: Credentials) -> Result<(), RemoteError>;

    /// Clears saved credentials.
    async fn clear_credentials(&self) -> Result<(), RemoteError>;

    /// Enables or disables demo mode.
    async fn set_demo_mode(&self, enabled: bool) -> Result<(), RemoteError>;
}

/// One recorded invocation on [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `config_status` call.
    ConfigStatus,
    /// `process_and_upload` call with its paths.
    ProcessAndUpload(Vec<String>),
    /// `copy_to_clipboard` call.
    CopyToClipboard(String),
    /// `reveal_path` call.
    RevealPath(String),
    /// `open_url` call.
    OpenUrl(String),
    /// `delete_object` call.
    DeleteObject(String),
    /// `saved_credentials` call.
    SavedCredentials,
    /// `validate_credentials` call, keyed by bucket.
    ValidateCredentials(String),
    /// `save_credentials` call, keyed by bucket.
    SaveCredentials(String),
    /// `clear_credentials` call.
    ClearCredentials,
    /// `set_demo_mode` call.
    SetDemoMode(bool),
}

#[derive(Debug, Default)]
struct ScriptState {
    invocations: Vec<Invocation>,
    process_results: VecDeque<Result<ProcessOutcome, RemoteError>>,
    validation_results: VecDeque<Result<(), RemoteError>>,
    delete_result: Option<RemoteError>,
    saved: Option<Credentials>,
    status: ConfigStatus,
}

/// Deterministic in-process backend for tests and CI.
///
/// Results are queued per operation. Processing can be held open with
/// [`ScriptedBackend::hold_processing`] to observe in-flight behavior.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    state: Arc<Mutex<ScriptState>>,
    process_gate: Arc<Semaphore>,
    gated: Arc<Mutex<bool>>,
}

impl ScriptedBackend {
    /// Creates a backend in demo mode with no queued results.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState::default())),
            process_gate: Arc::new(Semaphore::new(0)),
            gated: Arc::new(Mutex::new(false)),
        }
    }

    /// Queues the result of the next `process_and_upload` call.
    pub fn push_process_result(&self, result: Result<ProcessOutcome, RemoteError>) {
        self.with_state(|state| state.process_results.push_back(result));
    }

    /// Queues the result of the next `validate_credentials` call.
    pub fn push_validation_result(&self, result: Result<(), RemoteError>) {
        self.with_state(|state| state.validation_results.push_back(result));
    }

    /// Makes every `delete_object` call fail with `error`.
    pub fn fail_deletes(&self, error: RemoteError) {
        self.with_state(|state| state.delete_result = Some(error));
    }

    /// Seeds previously saved credentials.
    pub fn seed_credentials(&self, credentials: Credentials) {
        self.with_state(|state| {
            state.status.is_configured = true;
            state.status.bucket_name = Some(credentials.bucket_name.clone());
            state.saved = Some(credentials);
        });
    }

    /// Overrides the reported configuration status.
    pub fn set_status(&self, status: ConfigStatus) {
        self.with_state(|state| state.status = status);
    }

    /// Holds every `process_and_upload` call until [`Self::release_processing`].
    pub fn hold_processing(&self) {
        if let Ok(mut gated) = self.gated.lock() {
            *gated = true;
        }
    }

    /// Lets `permits` held processing calls complete.
    pub fn release_processing(&self, permits: usize) {
        self.process_gate.add_permits(permits);
    }

    /// Returns all invocations recorded so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.with_state(|state| state.invocations.clone())
    }

    /// Counts recorded invocations matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Invocation) -> bool) -> usize {
        self.with_state(|state| state.invocations.iter().filter(|call| predicate(call)).count())
    }

    fn record(&self, invocation: Invocation) {
        self.with_state(|state| state.invocations.push(invocation));
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ScriptState) -> T) -> T {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    fn is_gated(&self) -> bool {
        self.gated.lock().map(|gated| *gated).unwrap_or(false)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteBackend for ScriptedBackend {
    async fn config_status(&self) -> Result<ConfigStatus, RemoteError> {
        self.record(Invocation::ConfigStatus);
        Ok(self.with_state(|state| state.status.clone()))
    }

    async fn process_and_upload(&self, paths: Vec<String>) -> Result<ProcessOutcome, RemoteError> {
        self.record(Invocation::ProcessAndUpload(paths));
        if self.is_gated() {
            let permit = self
                .process_gate
                .acquire()
                .await
                .map_err(|_| RemoteError::new("scripted processing gate closed"))?;
            permit.forget();
        }

        self.with_state(|state| state.process_results.pop_front())
            .unwrap_or_else(|| Err(RemoteError::new("no scripted processing result")))
    }

    async fn copy_to_clipboard(&self, text: String) -> Result<(), RemoteError> {
        self.record(Invocation::CopyToClipboard(text));
        Ok(())
    }

    async fn reveal_path(&self, path: String) -> Result<(), RemoteError> {
        self.record(Invocation::RevealPath(path));
        Ok(())
    }

    async fn open_url(&self, url: String) -> Result<(), RemoteError> {
        self.record(Invocation::OpenUrl(url));
        Ok(())
    }

    async fn delete_object(&self, storage_key: String) -> Result<(), RemoteError> {
        self.record(Invocation::DeleteObject(storage_key));
        match self.with_state(|state| state.delete_result.clone()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn saved_credentials(&self) -> Result<Option<Credentials>, RemoteError> {
        self.record(Invocation::SavedCredentials);
        Ok(self.with_state(|state| state.saved.clone()))
    }

    async fn validate_credentials(&self, credentials: Credentials) -> Result<(), RemoteError> {
        self.record(Invocation::ValidateCredentials(credentials.bucket_name));
        self.with_state(|state| state.validation_results.pop_front())
            .unwrap_or(Ok(()))
    }

    async fn save_credentials(&self, credentials: Credentials) -> Result<(), RemoteError> {
        self.record(Invocation::SaveCredentials(credentials.bucket_name.clone()));
        self.with_state(|state| {
            state.status = ConfigStatus {
                is_configured: true,
                demo_mode: false,
                bucket_name: Some(credentials.bucket_name.clone()),
            };
            state.saved = Some(credentials);
        });
        Ok(())
    }

    async fn clear_credentials(&self) -> Result<(), RemoteError> {
        self.record(Invocation::ClearCredentials);
        self.with_state(|state| {
            state.saved = None;
            state.status.is_configured = false;
            state.status.bucket_name = None;
        });
        Ok(())
    }

    async fn set_demo_mode(&self, enabled: bool) -> Result<(), RemoteError> {
        self.record(Invocation::SetDemoMode(enabled));
        self.with_state(|state| state.status.demo_mode = enabled);
        Ok(())
    }
}
