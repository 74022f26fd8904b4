//! Environment-driven application configuration.

use std::path::PathBuf;

use thiserror::Error;
use zipdrop_intake::DEBOUNCE_WINDOW_MS;
use zipdrop_session::{AUTO_HIDE_MS, ERROR_RESET_MS, SUCCESS_RESET_MS, SessionTimings};

/// Overrides the history storage directory.
pub const DATA_DIR_ENV: &str = "ZIPDROP_DATA_DIR";
/// Default log filter when `RUST_LOG` is unset.
pub const LOG_ENV: &str = "ZIPDROP_LOG";
/// Log filter used when neither variable is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

const APP_DIR_NAME: &str = "zipdrop";

/// Delays used across intake, session, and window lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Minimum spacing between accepted drops.
    pub debounce_ms: u64,
    /// Error -> idle delay.
    pub error_reset_ms: u64,
    /// Success -> idle delay.
    pub success_reset_ms: u64,
    /// Success -> window hide delay.
    pub auto_hide_ms: u64,
}

impl Timings {
    /// Session controller view of these timings.
    pub fn session(&self) -> SessionTimings {
        SessionTimings {
            error_reset_ms: self.error_reset_ms,
            success_reset_ms: self.success_reset_ms,
            auto_hide_ms: self.auto_hide_ms,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_WINDOW_MS,
            error_reset_ms: ERROR_RESET_MS,
            success_reset_ms: SUCCESS_RESET_MS,
            auto_hide_ms: AUTO_HIDE_MS,
        }
    }
}

/// Configuration failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No override was given and the platform has no data directory.
    #[error("no data directory available; set {DATA_DIR_ENV}")]
    NoDataDir,
    /// A variable was set to an unusable value.
    #[error("{name} must not be empty")]
    EmptyValue {
        /// Variable name.
        name: &'static str,
    },
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the history slot.
    pub data_dir: PathBuf,
    /// Default log filter directive.
    pub log_filter: String,
    /// Lifecycle delays.
    pub timings: Timings,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyValue`] for blank overrides and
    /// [`ConfigError::NoDataDir`] when no data directory can be resolved.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match lookup(DATA_DIR_ENV) {
            Some(value) => PathBuf::from(non_empty(DATA_DIR_ENV, value)?),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let log_filter = match lookup(LOG_ENV) {
            Some(value) => non_empty(LOG_ENV, value)?,
            None => DEFAULT_LOG_FILTER.to_string(),
        };

        Ok(Self {
            data_dir,
            log_filter,
            timings: Timings::default(),
        })
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue { name });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for environment resolution.

    use super::*;

    #[test]
    fn overrides_take_precedence() {
        let config = AppConfig::from_lookup(|name| match name {
            DATA_DIR_ENV => Some("/srv/zipdrop".to_string()),
            LOG_ENV => Some(" debug ".to_string()),
            _ => None,
        })
        .expect("config should resolve");

        assert_eq!(config.data_dir, PathBuf::from("/srv/zipdrop"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn blank_override_is_rejected() {
        let error = AppConfig::from_lookup(|name| (name == LOG_ENV).then(String::new))
            .expect_err("blank log filter should fail");
        assert_eq!(error, ConfigError::EmptyValue { name: LOG_ENV });
    }
}
