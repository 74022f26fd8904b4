#![warn(missing_docs)]
//! # zipdrop-app
//!
//! ## Purpose
//! Orchestrates intake, upload sessions, history, credential settings, and the
//! window lifecycle for `zipdrop` on one cooperative event loop.
//!
//! ## Responsibilities
//! - Resolve [`AppConfig`] from the environment and install logging.
//! - Translate events into subsystem transitions through [`App::handle`].
//! - Execute remote calls, timers, and detached deletes on tokio in [`Runtime`].
//! - Run the startup sequence: history first, then configuration and saved
//!   credentials.
//!
//! ## Data flow
//! OS drag source / UI events -> [`Runtime`] channel -> [`App::handle`] ->
//! [`Effect`]s -> spawned remote calls and timers -> settlement events back
//! into the channel.
//!
//! ## Ownership and lifetimes
//! The loop owns all orchestration state. Spawned tasks own clones of their
//! inputs and a sender; they never see the state itself.
//!
//! ## Error model
//! Startup failures are wrapped in [`AppError`]. After startup no error is
//! fatal: failures become transient UI state or log lines.
//!
//! ## Security and privacy notes
//! Credentials only travel inside effects to the remote boundary and are
//! redacted in debug output.

mod config;
mod logging;
mod orchestrator;
mod runtime;

use std::path::Path;

use thiserror::Error;
use zipdrop_history::{FileStore, HistoryStore};

pub use config::{
    AppConfig, ConfigError, DATA_DIR_ENV, DEFAULT_LOG_FILTER, LOG_ENV, Timings,
};
pub use logging::init_tracing;
pub use orchestrator::{App, AppEvent, Effect, RecordAction};
pub use runtime::{AppHandle, Clock, Runtime};
pub use zipdrop_ui::WindowCommand;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("ZIPDROP_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Loads persisted history from `data_dir` and builds the orchestrator.
///
/// A missing or malformed history slot starts empty.
pub fn open_app(data_dir: &Path, timings: Timings) -> App<FileStore> {
    let history = HistoryStore::load(FileStore::new(data_dir));
    App::new(history, timings, APP_VERSION)
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Drag listeners could not be registered.
    #[error("intake error: {0}")]
    Intake(#[from] zipdrop_intake::IntakeError),
    /// The event loop has stopped.
    #[error("event loop closed")]
    LoopClosed,
}
