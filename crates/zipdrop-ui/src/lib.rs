#![warn(missing_docs)]
//! # zipdrop-ui
//!
//! ## Purpose
//! Defines the window lifecycle timers and the UI-facing state projection for
//! `zipdrop`.
//!
//! ## Responsibilities
//! - Schedule, cancel, and recognise the session reset and auto-hide timers.
//! - Turn Escape into an immediate hide request.
//! - Project session, history, configuration, and panel flags into [`UiState`].
//!
//! ## Data flow
//! The app loop asks [`WindowLifecycle`] for a [`ScheduledTimer`], sleeps for
//! `after_ms`, then hands the token back to [`WindowLifecycle::fire`]. Only the
//! latest token of each kind is honoured.
//!
//! ## Ownership and lifetimes
//! Tokens are plain `Copy` values; the lifecycle keeps only the generation of
//! the currently armed timer per kind.
//!
//! ## Error model
//! No recoverable errors. Superseded or cancelled timers are ignored.
//!
//! ## Security and privacy notes
//! UI state holds no credentials; only the configured bucket name is shown.

use std::collections::HashMap;

use tracing::debug;
use zipdrop_core::{ConfigStatus, UploadRecord};
use zipdrop_session::{SessionSnapshot, SessionState};

/// Timer owned by the window lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Returns a terminal session state to idle.
    SessionReset,
    /// Hides the window after a success.
    AutoHide,
}

/// Identifies one scheduling of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    /// Timer kind.
    pub kind: TimerKind,
    /// Monotonic generation; a newer scheduling supersedes older ones.
    pub generation: u64,
}

/// Timer the caller must arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    /// Token to hand back when the delay elapses.
    pub token: TimerToken,
    /// Delay in milliseconds.
    pub after_ms: u64,
}

/// Request addressed to the hosting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    /// Hide the window.
    Hide,
}

/// Window visibility and timer bookkeeping.
#[derive(Debug, Clone)]
pub struct WindowLifecycle {
    next_generation: u64,
    armed: HashMap<TimerKind, u64>,
    visible: bool,
}

impl WindowLifecycle {
    /// Creates a visible window with no armed timers.
    pub fn new() -> Self {
        Self {
            next_generation: 0,
            armed: HashMap::new(),
            visible: true,
        }
    }

    /// Returns `true` while the window is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` when a timer of `kind` is pending.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }

    /// Arms `kind`, superseding any pending timer of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, after_ms: u64) -> ScheduledTimer {
        self.next_generation += 1;
        let generation = self.next_generation;
        if self.armed.insert(kind, generation).is_some() {
            debug!(?kind, generation, "timer rescheduled");
        }
        ScheduledTimer {
            token: TimerToken { kind, generation },
            after_ms,
        }
    }

    /// Disarms `kind`. Returns `true` when a timer was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.armed.remove(&kind).is_some()
    }

    /// Accepts an elapsed timer. Returns `true` only for the current token of
    /// its kind, which is then disarmed.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.armed.get(&token.kind) != Some(&token.generation) {
            debug!(kind = ?token.kind, generation = token.generation, "stale timer ignored");
            return false;
        }
        self.armed.remove(&token.kind);
        true
    }

    /// Escape pressed: hide now, regardless of session state.
    pub fn on_escape(&mut self) -> WindowCommand {
        self.hide()
    }

    /// Auto-hide elapsed or Escape pressed.
    pub fn hide(&mut self) -> WindowCommand {
        self.visible = false;
        self.armed.remove(&TimerKind::AutoHide);
        WindowCommand::Hide
    }

    /// The host showed the window again.
    pub fn on_shown(&mut self) {
        self.visible = true;
    }
}

impl Default for WindowLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// One history row as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// Record id, used by row actions.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Formatted processed size.
    pub human_size: String,
    /// Link or local path shown to the user.
    pub location: String,
    /// Whether the file only exists locally.
    pub is_local_only: bool,
}

impl From<&UploadRecord> for HistoryItem {
    fn from(record: &UploadRecord) -> Self {
        let location = match (&record.local_path, record.is_local_only) {
            (Some(path), true) => path.clone(),
            _ => record.url.clone(),
        };
        Self {
            id: record.id.clone(),
            display_name: record.display_name.clone(),
            human_size: record.human_size.clone(),
            location,
            is_local_only: record.is_local_only,
        }
    }
}

/// Aggregate UI runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Upload session view.
    pub session: SessionSnapshot,
    /// History rows, most recent first.
    pub history: Vec<HistoryItem>,
    /// Last known configuration status.
    pub config: ConfigStatus,
    /// Whether the settings panel is open.
    pub settings_open: bool,
    /// Whether the window is shown.
    pub window_visible: bool,
}

impl UiState {
    /// Creates default UI state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            session: SessionSnapshot {
                state: SessionState::Idle,
                display_name: None,
                message: None,
            },
            history: Vec::new(),
            config: ConfigStatus::default(),
            settings_open: false,
            window_visible: true,
        }
    }

    /// Replaces history rows from records.
    pub fn set_history(&mut self, records: &[UploadRecord]) {
        self.history = records.iter().map(HistoryItem::from).collect();
    }

    /// Single status line for the drop zone.
    pub fn status_line(&self) -> String {
        match self.session.state {
            SessionState::Idle if self.config.demo_mode => "Drop files to save locally".to_string(),
            SessionState::Idle => match &self.config.bucket_name {
                Some(bucket) => format!("Drop files to upload to {bucket}"),
                None => "Drop files to upload".to_string(),
            },
            SessionState::DragOver => "Release to drop".to_string(),
            SessionState::Processing => match &self.session.display_name {
                Some(name) => format!("Processing {name}"),
                None => "Processing".to_string(),
            },
            SessionState::Success | SessionState::Error => {
                self.session.message.clone().unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for timer tokens and status text.

    use super::*;

    #[test]
    fn rescheduling_supersedes_previous_token() {
        let mut lifecycle = WindowLifecycle::new();
        let first = lifecycle.schedule(TimerKind::SessionReset, 2_000);
        let second = lifecycle.schedule(TimerKind::SessionReset, 3_000);

        assert!(!lifecycle.fire(first.token));
        assert!(lifecycle.fire(second.token));
        assert!(!lifecycle.fire(second.token));
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let mut lifecycle = WindowLifecycle::new();
        let reset = lifecycle.schedule(TimerKind::SessionReset, 2_000);
        let hide = lifecycle.schedule(TimerKind::AutoHide, 10_000);

        assert!(lifecycle.fire(reset.token));
        assert!(lifecycle.is_armed(TimerKind::AutoHide));
        assert!(lifecycle.fire(hide.token));
    }

    #[test]
    fn idle_status_reflects_demo_mode() {
        let mut state = UiState::new("0.1.0");
        assert_eq!(state.status_line(), "Drop files to save locally");

        state.config = ConfigStatus {
            is_configured: true,
            demo_mode: false,
            bucket_name: Some("drops".to_string()),
        };
        assert_eq!(state.status_line(), "Drop files to upload to drops");
    }
}
