//! Event-to-effect orchestration over the subsystem state machines.
//!
//! [`App::handle`] is synchronous and never awaits. Every guard check and
//! state change happens inside it, so the effects it returns can be executed
//! concurrently without reordering decisions.

use tracing::{debug, info, warn};
use zipdrop_core::{ConfigStatus, CredentialField, Credentials, ProcessOutcome};
use zipdrop_history::{HistoryStore, KeyValueStore, RemoteDeletion};
use zipdrop_intake::{DragEvent, IntakeDecision, IntakeDispatcher};
use zipdrop_remote::RemoteError;
use zipdrop_session::{SessionController, Settlement, Submission};
use zipdrop_settings::{SaveOutcome, SettingsManager, ValidationOutcome, ValidationTicket};
use zipdrop_ui::{ScheduledTimer, TimerKind, TimerToken, UiState, WindowCommand, WindowLifecycle};

use crate::config::Timings;

/// Side-effect request for which a result is logged and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Copy a record link.
    CopyLink,
    /// Reveal a local file.
    Reveal,
    /// Open a cloud link.
    Open,
}

/// Input to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// OS drag notification.
    Drag(DragEvent),
    /// Remote processing settled.
    ProcessSettled(Result<ProcessOutcome, RemoteError>),
    /// A scheduled timer elapsed.
    TimerElapsed(TimerToken),
    /// Escape pressed.
    EscapePressed,
    /// The host showed the window.
    WindowShown,
    /// Configuration status arrived.
    ConfigLoaded(Result<ConfigStatus, RemoteError>),
    /// Saved credentials arrived.
    SavedCredentialsLoaded(Result<Option<Credentials>, RemoteError>),
    /// Remove one history record.
    RemoveRecord {
        /// Record id.
        id: String,
        /// Also delete the cloud object.
        delete_remote: bool,
    },
    /// Remove every history record.
    ClearHistory,
    /// Copy a record's link.
    CopyRecordLink(String),
    /// Reveal a local-only record in the file manager.
    RevealRecord(String),
    /// Open a cloud record in the browser.
    OpenRecord(String),
    /// A record action settled.
    RecordActionSettled(RecordAction, Result<(), RemoteError>),
    /// Open the settings panel.
    OpenSettings,
    /// Close the settings panel.
    CloseSettings,
    /// Edit one credential field.
    EditCredential(CredentialField, String),
    /// Validate the credential draft.
    ValidateCredentials,
    /// Credential validation settled.
    ValidationSettled {
        /// Draft revision the call was issued for.
        revision: u64,
        /// Remote result.
        result: Result<(), RemoteError>,
    },
    /// Save the credential draft.
    SaveCredentials,
    /// Credential save settled.
    SaveSettled(Result<(), RemoteError>),
    /// Clear saved credentials.
    ClearCredentials,
    /// Credential clear settled.
    ClearSettled(Result<(), RemoteError>),
    /// Turn demo mode on or off.
    SetDemoMode(bool),
    /// Demo mode change settled.
    DemoModeSettled(Result<(), RemoteError>),
    /// Stop the event loop.
    Shutdown,
}

/// Work the runtime must perform on behalf of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Invoke remote processing once with these paths.
    ProcessAndUpload(Vec<String>),
    /// Arm a timer.
    StartTimer(ScheduledTimer),
    /// Request for the hosting window.
    Window(WindowCommand),
    /// Detached remote delete; the result is discarded.
    DeleteObject(String),
    /// Request configuration status.
    FetchConfig,
    /// Request saved credentials.
    FetchSavedCredentials,
    /// Validate credentials remotely.
    ValidateCredentials(ValidationTicket),
    /// Persist credentials remotely.
    SaveCredentials(Credentials),
    /// Clear saved credentials remotely.
    ClearCredentials,
    /// Change demo mode remotely.
    SetDemoMode(bool),
    /// Record action to perform.
    RecordAction(RecordAction, String),
    /// Stop the loop.
    Exit,
}

/// Orchestrator state shared by every event.
#[derive(Debug)]
pub struct App<S: KeyValueStore> {
    intake: IntakeDispatcher,
    session: SessionController,
    history: HistoryStore<S>,
    settings: SettingsManager,
    window: WindowLifecycle,
    config: ConfigStatus,
    settings_open: bool,
    version: String,
}

impl<S: KeyValueStore> App<S> {
    /// Creates the orchestrator around an already loaded history.
    pub fn new(history: HistoryStore<S>, timings: Timings, version: impl Into<String>) -> Self {
        Self {
            intake: IntakeDispatcher::with_debounce_window(timings.debounce_ms),
            session: SessionController::with_timings(timings.session()),
            history,
            settings: SettingsManager::new(),
            window: WindowLifecycle::new(),
            config: ConfigStatus::default(),
            settings_open: false,
            version: version.into(),
        }
    }

    /// Effects issued once when the loop starts.
    pub fn startup(&self) -> Vec<Effect> {
        info!(records = self.history.len(), "startup: requesting configuration");
        vec![Effect::FetchConfig, Effect::FetchSavedCredentials]
    }

    /// Upload session controller.
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Upload history.
    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Credential settings.
    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    /// Window lifecycle.
    pub fn window(&self) -> &WindowLifecycle {
        &self.window
    }

    /// Last known configuration status.
    pub fn config(&self) -> &ConfigStatus {
        &self.config
    }

    /// Returns `true` while the settings panel is open.
    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// Projects the current state for rendering.
    pub fn ui_state(&self) -> UiState {
        let mut state = UiState::new(self.version.clone());
        state.session = self.session.snapshot();
        state.set_history(self.history.all());
        state.config = self.config.clone();
        state.settings_open = self.settings_open;
        state.window_visible = self.window.is_visible();
        state
    }

    /// Applies one event and returns the effects to execute.
    pub fn handle(&mut self, event: AppEvent, now_ms: u64) -> Vec<Effect> {
        match event {
            AppEvent::Drag(event) => self.on_drag(event, now_ms),
            AppEvent::ProcessSettled(result) => self.on_process_settled(result, now_ms),
            AppEvent::TimerElapsed(token) => self.on_timer(token),
            AppEvent::EscapePressed => vec![Effect::Window(self.window.on_escape())],
            AppEvent::WindowShown => {
                self.window.on_shown();
                Vec::new()
            }
            AppEvent::ConfigLoaded(result) => {
                match result {
                    Ok(status) => {
                        debug!(?status, "configuration status loaded");
                        self.settings.set_demo_mode(status.demo_mode);
                        self.config = status;
                    }
                    Err(error) => warn!(%error, "configuration status unavailable"),
                }
                Vec::new()
            }
            AppEvent::SavedCredentialsLoaded(result) => {
                match result {
                    Ok(saved) => self.settings.activate(saved, self.config.demo_mode),
                    Err(error) => {
                        warn!(%error, "saved credentials unavailable");
                        self.settings.activate(None, self.config.demo_mode);
                    }
                }
                Vec::new()
            }
            AppEvent::RemoveRecord { id, delete_remote } => self.on_remove_record(&id, delete_remote),
            AppEvent::ClearHistory => {
                if let Err(error) = self.history.clear() {
                    warn!(%error, "history clear not persisted");
                }
                Vec::new()
            }
            AppEvent::CopyRecordLink(id) => self
                .history
                .get(&id)
                .map(|record| vec![Effect::RecordAction(RecordAction::CopyLink, record.url.clone())])
                .unwrap_or_default(),
            AppEvent::RevealRecord(id) => self
                .history
                .get(&id)
                .filter(|record| record.is_local_only)
                .and_then(|record| record.local_path.clone())
                .map(|path| vec![Effect::RecordAction(RecordAction::Reveal, path)])
                .unwrap_or_default(),
            AppEvent::OpenRecord(id) => self
                .history
                .get(&id)
                .filter(|record| !record.is_local_only)
                .map(|record| vec![Effect::RecordAction(RecordAction::Open, record.url.clone())])
                .unwrap_or_default(),
            AppEvent::RecordActionSettled(action, result) => {
                if let Err(error) = result {
                    warn!(?action, %error, "record action failed");
                }
                Vec::new()
            }
            AppEvent::OpenSettings => {
                self.settings_open = true;
                vec![Effect::FetchSavedCredentials]
            }
            AppEvent::CloseSettings => {
                self.settings_open = false;
                Vec::new()
            }
            AppEvent::EditCredential(field, value) => {
                if let Err(error) = self.settings.edit(field, value) {
                    debug!(%error, ?field, "credential edit refused");
                }
                Vec::new()
            }
            AppEvent::ValidateCredentials => match self.settings.begin_validation() {
                Ok(ticket) => vec![Effect::ValidateCredentials(ticket)],
                Err(error) => {
                    debug!(%error, "validation not started");
                    Vec::new()
                }
            },
            AppEvent::ValidationSettled { revision, result } => {
                if let ValidationOutcome::Stale = self.settings.finish_validation(revision, result) {
                    debug!(revision, "validation result superseded by an edit");
                }
                Vec::new()
            }
            AppEvent::SaveCredentials => match self.settings.begin_save() {
                Ok(credentials) => vec![Effect::SaveCredentials(credentials)],
                Err(error) => {
                    debug!(%error, "save not started");
                    Vec::new()
                }
            },
            AppEvent::SaveSettled(result) => match self.settings.finish_save(result) {
                SaveOutcome::Saved => {
                    self.settings_open = false;
                    vec![Effect::FetchConfig]
                }
                SaveOutcome::Failed(_) | SaveOutcome::Ignored => Vec::new(),
            },
            AppEvent::ClearCredentials => vec![Effect::ClearCredentials],
            AppEvent::ClearSettled(result) => match result {
                Ok(()) => {
                    info!("saved credentials cleared");
                    self.settings.clear();
                    vec![Effect::FetchConfig]
                }
                Err(error) => {
                    warn!(%error, "credential clear failed");
                    Vec::new()
                }
            },
            AppEvent::SetDemoMode(enabled) => vec![Effect::SetDemoMode(enabled)],
            AppEvent::DemoModeSettled(result) => match result {
                Ok(()) => vec![Effect::FetchConfig],
                Err(error) => {
                    warn!(%error, "demo mode change failed");
                    Vec::new()
                }
            },
            AppEvent::Shutdown => vec![Effect::Exit],
        }
    }

    fn on_drag(&mut self, event: DragEvent, now_ms: u64) -> Vec<Effect> {
        match self.intake.dispatch(event, self.session.is_processing(), now_ms) {
            IntakeDecision::EnterDragOver => {
                self.session.on_drag_over();
                Vec::new()
            }
            IntakeDecision::ReturnToIdle => {
                self.session.on_drag_leave();
                Vec::new()
            }
            IntakeDecision::Forward(paths) => self.on_batch(paths),
            IntakeDecision::Discard(_) => Vec::new(),
        }
    }

    fn on_batch(&mut self, paths: Vec<String>) -> Vec<Effect> {
        match self.session.submit(paths) {
            Submission::Discarded => Vec::new(),
            Submission::Rejected { reset_after_ms, .. } => {
                vec![self.schedule(TimerKind::SessionReset, reset_after_ms)]
            }
            Submission::Started { paths } => {
                self.window.cancel(TimerKind::SessionReset);
                self.window.cancel(TimerKind::AutoHide);
                info!(files = paths.len(), "batch accepted");
                vec![Effect::ProcessAndUpload(paths)]
            }
        }
    }

    fn on_process_settled(
        &mut self,
        result: Result<ProcessOutcome, RemoteError>,
        now_ms: u64,
    ) -> Vec<Effect> {
        match self.session.settle(result, now_ms) {
            Settlement::Succeeded {
                record,
                reset_after_ms,
                hide_after_ms,
            } => {
                if let Err(error) = self.history.prepend(record) {
                    warn!(%error, "history update not persisted");
                }
                vec![
                    self.schedule(TimerKind::SessionReset, reset_after_ms),
                    self.schedule(TimerKind::AutoHide, hide_after_ms),
                ]
            }
            Settlement::Failed { reset_after_ms, .. } => {
                vec![self.schedule(TimerKind::SessionReset, reset_after_ms)]
            }
            Settlement::Ignored => Vec::new(),
        }
    }

    fn on_timer(&mut self, token: TimerToken) -> Vec<Effect> {
        if !self.window.fire(token) {
            return Vec::new();
        }
        match token.kind {
            TimerKind::SessionReset => {
                self.session.reset_to_idle();
                Vec::new()
            }
            TimerKind::AutoHide => {
                info!("auto-hide elapsed");
                vec![Effect::Window(self.window.hide())]
            }
        }
    }

    fn on_remove_record(&mut self, id: &str, delete_remote: bool) -> Vec<Effect> {
        let deletion = if delete_remote {
            RemoteDeletion::Request
        } else {
            RemoteDeletion::Keep
        };

        match self.history.remove(id, deletion) {
            Ok(Some(removal)) => removal
                .delete_storage_key
                .map(|key| vec![Effect::DeleteObject(key)])
                .unwrap_or_default(),
            Ok(None) => {
                debug!(id, "remove requested for unknown record");
                Vec::new()
            }
            Err(error) => {
                warn!(%error, id, "history removal not persisted");
                Vec::new()
            }
        }
    }

    fn schedule(&mut self, kind: TimerKind, after_ms: u64) -> Effect {
        Effect::StartTimer(self.window.schedule(kind, after_ms))
    }
}
