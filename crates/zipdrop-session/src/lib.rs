#![warn(missing_docs)]
//! # zipdrop-session
//!
//! ## Purpose
//! Implements the upload session controller: the state machine that owns the
//! single-flight guard and turns accepted batches into upload records.
//!
//! ## Responsibilities
//! - Track `idle`, `drag-over`, `processing`, `success`, and `error`.
//! - Validate submitted batches and reject them with a self-clearing error.
//! - Guarantee at most one remote processing call in flight.
//! - Build an [`UploadRecord`] and status message from a remote outcome.
//!
//! ## Data flow
//! Intake forwards a batch -> [`SessionController::submit`] -> caller invokes
//! the remote operation once -> [`SessionController::settle`] -> record handed
//! to history, reset/hide delays handed to the window lifecycle.
//!
//! ## Ownership and lifetimes
//! The in-flight batch is stored inside the controller; the guard is simply
//! "a batch is stored", so it cannot disagree with the batch it protects.
//!
//! ## Error model
//! Validation and remote failures are states, not errors: they move the
//! controller to [`SessionState::Error`] with a message and a reset delay.

use std::fmt;

use tracing::{debug, info, warn};
use zipdrop_core::{
    ProcessOutcome, UploadRecord, ValidationError, file_name, success_display_name,
    validate_batch,
};

/// Delay before an error returns to idle.
pub const ERROR_RESET_MS: u64 = 3_000;
/// Delay before a success returns to idle.
pub const SUCCESS_RESET_MS: u64 = 2_000;
/// Delay after a success before the window hides itself.
pub const AUTO_HIDE_MS: u64 = 10_000;

/// Status shown after a demo-mode success.
pub const SAVED_LOCALLY_MESSAGE: &str = "Saved locally, path copied to clipboard";
/// Status shown after a cloud success.
pub const COPIED_LINK_MESSAGE: &str = "Link copied to clipboard";

/// Upload session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Waiting for a drop.
    Idle,
    /// Files hover over the window.
    DragOver,
    /// A batch is being processed remotely.
    Processing,
    /// The last batch succeeded.
    Success,
    /// The last batch failed validation or processing.
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::DragOver => "drag-over",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Delays applied by the controller's transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Error -> idle delay.
    pub error_reset_ms: u64,
    /// Success -> idle delay.
    pub success_reset_ms: u64,
    /// Success -> window hide delay.
    pub auto_hide_ms: u64,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            error_reset_ms: ERROR_RESET_MS,
            success_reset_ms: SUCCESS_RESET_MS,
            auto_hide_ms: AUTO_HIDE_MS,
        }
    }
}

/// Result of submitting a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A batch is already in flight; nothing changed.
    Discarded,
    /// The batch failed validation; state is `error`.
    Rejected {
        /// Validation failure.
        error: ValidationError,
        /// Delay before returning to idle.
        reset_after_ms: u64,
    },
    /// The batch was accepted; the caller must invoke the remote operation
    /// exactly once with these paths and report back through `settle`.
    Started {
        /// Paths to process.
        paths: Vec<String>,
    },
}

/// Result of settling an in-flight batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Remote processing succeeded.
    Succeeded {
        /// Record to prepend to history.
        record: UploadRecord,
        /// Delay before returning to idle.
        reset_after_ms: u64,
        /// Delay before the window hides.
        hide_after_ms: u64,
    },
    /// Remote processing failed.
    Failed {
        /// Failure message shown to the user.
        message: String,
        /// Delay before returning to idle.
        reset_after_ms: u64,
    },
    /// No batch was in flight.
    Ignored,
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current state.
    pub state: SessionState,
    /// Name of the current or last processed item.
    pub display_name: Option<String>,
    /// User-facing status message.
    pub message: Option<String>,
}

/// Upload session state machine.
#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    in_flight: Option<Vec<String>>,
    display_name: Option<String>,
    message: Option<String>,
    timings: SessionTimings,
}

impl SessionController {
    /// Creates an idle controller with default timings.
    pub fn new() -> Self {
        Self::with_timings(SessionTimings::default())
    }

    /// Creates an idle controller with custom timings.
    pub fn with_timings(timings: SessionTimings) -> Self {
        Self {
            state: SessionState::Idle,
            in_flight: None,
            display_name: None,
            message: None,
            timings,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while a batch is in flight.
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Current status message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Current display name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Snapshot for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            display_name: self.display_name.clone(),
            message: self.message.clone(),
        }
    }

    /// Files hover over the window. Returns `true` when the state changed.
    ///
    /// A hover replaces any `success` or `error` message.
    pub fn on_drag_over(&mut self) -> bool {
        if self.is_processing() || self.state == SessionState::DragOver {
            return false;
        }
        self.message = None;
        self.transition(SessionState::DragOver);
        true
    }

    /// Hover left the window. Returns `true` when the state changed.
    pub fn on_drag_leave(&mut self) -> bool {
        if self.is_processing() || self.state != SessionState::DragOver {
            return false;
        }
        self.transition(SessionState::Idle);
        true
    }

    /// Submits a batch forwarded by intake.
    ///
    /// The in-flight guard is checked and set before this returns, so a second
    /// submission can never start a second remote call.
    pub fn submit(&mut self, paths: Vec<String>) -> Submission {
        if self.is_processing() {
            debug!(files = paths.len(), "batch discarded: session in flight");
            return Submission::Discarded;
        }

        if let Err(error) = validate_batch(&paths) {
            warn!(%error, files = paths.len(), "batch rejected");
            self.message = Some(error.to_string());
            self.transition(SessionState::Error);
            return Submission::Rejected {
                error,
                reset_after_ms: self.timings.error_reset_ms,
            };
        }

        self.display_name = paths.first().map(|path| file_name(path).to_string());
        self.message = None;
        self.in_flight = Some(paths.clone());
        self.transition(SessionState::Processing);
        Submission::Started { paths }
    }

    /// Settles the in-flight batch with the remote result.
    ///
    /// The guard is released on both branches before any record is built.
    pub fn settle(
        &mut self,
        result: Result<ProcessOutcome, impl fmt::Display>,
        now_ms: u64,
    ) -> Settlement {
        let Some(paths) = self.in_flight.take() else {
            warn!("settlement received with no batch in flight");
            return Settlement::Ignored;
        };

        match result {
            Ok(outcome) => {
                let display_name = success_display_name(&paths, &outcome.file_type);
                let record = UploadRecord::from_outcome(display_name.clone(), &outcome, now_ms);
                let message = if outcome.is_demo {
                    SAVED_LOCALLY_MESSAGE
                } else {
                    COPIED_LINK_MESSAGE
                };

                info!(
                    record_id = %record.id,
                    display_name = %display_name,
                    size = %record.human_size,
                    demo = outcome.is_demo,
                    "upload session succeeded"
                );
                self.display_name = Some(display_name);
                self.message = Some(message.to_string());
                self.transition(SessionState::Success);
                Settlement::Succeeded {
                    record,
                    reset_after_ms: self.timings.success_reset_ms,
                    hide_after_ms: self.timings.auto_hide_ms,
                }
            }
            Err(error) => {
                let message = error.to_string();
                warn!(error = %message, files = paths.len(), "upload session failed");
                self.message = Some(message.clone());
                self.transition(SessionState::Error);
                Settlement::Failed {
                    message,
                    reset_after_ms: self.timings.error_reset_ms,
                }
            }
        }
    }

    /// Returns a terminal state to idle and clears the message.
    ///
    /// Only `success` and `error` are affected; a reset that fires after a new
    /// hover or batch began is a no-op.
    pub fn reset_to_idle(&mut self) -> bool {
        if !matches!(self.state, SessionState::Success | SessionState::Error) {
            return false;
        }
        self.message = None;
        self.transition(SessionState::Idle);
        true
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session transition");
        }
        self.state = next;
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
