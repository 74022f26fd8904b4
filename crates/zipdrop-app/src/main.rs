#![warn(missing_docs)]
//! # zipdrop-app binary
//!
//! Headless entry point. Resolves configuration, installs logging, loads
//! history, and prints a status summary. Desktop hosts embed [`Runtime`]
//! with their own drag source and remote backend.
//!
//! [`Runtime`]: zipdrop_app::Runtime

use zipdrop_app::{AppConfig, AppError, app_version, init_tracing, open_app};

/// CLI entry point.
fn main() {
    if let Err(error) = run() {
        eprintln!("zipdrop: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_filter);
    tracing::info!(version = app_version(), data_dir = %config.data_dir.display(), "zipdrop starting");

    let app = open_app(&config.data_dir, config.timings);
    let state = app.ui_state();

    println!("zipdrop-app {}", app_version());
    println!("data_dir={}", config.data_dir.display());
    println!("history_records={}", state.history.len());
    for item in &state.history {
        println!("  {}  {}  {}", item.display_name, item.human_size, item.location);
    }
    Ok(())
}
