#![warn(missing_docs)]
//! # zipdrop-settings
//!
//! ## Purpose
//! Implements the credential settings panel: the working draft of cloud
//! storage credentials and the state machine that gates saving behind an
//! explicit validation.
//!
//! ## Responsibilities
//! - Load saved credentials and presume them valid.
//! - Invalidate on any edit to account id, bucket, or keys.
//! - Require a successful validation since the last edit before saving.
//! - Lock all fields while demo mode is active.
//!
//! ## Data flow
//! Panel activation -> [`SettingsManager::activate`] -> edits ->
//! [`SettingsManager::begin_validation`] -> remote check ->
//! [`SettingsManager::finish_validation`] -> [`SettingsManager::begin_save`] ->
//! remote persist -> [`SettingsManager::finish_save`] -> parent refreshes
//! configuration status and closes the panel.
//!
//! ## Ownership and lifetimes
//! Remote calls receive owned clones of the draft, tagged with the edit
//! revision they were taken from. A result for an older revision is stale.
//!
//! ## Error model
//! Local gate failures return [`SettingsError`] and are kept as the form
//! error until the next edit or retry. Remote failures are surfaced by message.
//!
//! ## Security and privacy notes
//! Credentials are never persisted or logged here; persistence belongs to the
//! remote boundary.
//!
//! ## Example
//! ```rust
//! use zipdrop_settings::{SettingsManager, SettingsPhase};
//!
//! let mut manager = SettingsManager::new();
//! manager.activate(None, false);
//! assert_eq!(manager.phase(), SettingsPhase::Editing);
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use zipdrop_core::{CredentialField, Credentials};

/// Fields that must be filled before a validation call.
pub const VALIDATION_FIELDS: [CredentialField; 4] = [
    CredentialField::AccountId,
    CredentialField::BucketName,
    CredentialField::AccessKey,
    CredentialField::SecretKey,
];

/// Fields that must be filled before saving.
pub const SAVE_FIELDS: [CredentialField; 5] = [
    CredentialField::AccountId,
    CredentialField::BucketName,
    CredentialField::AccessKey,
    CredentialField::SecretKey,
    CredentialField::PublicUrlBase,
];

/// Settings panel phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPhase {
    /// Draft has not been validated since its last edit.
    Editing,
    /// A validation call is in flight.
    Validating,
    /// Draft is usable.
    Validated,
    /// A save call is in flight.
    Saving,
}

/// Validation call to issue, tied to the draft revision it checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTicket {
    /// Draft revision at the time of the call.
    pub revision: u64,
    /// Credentials to check.
    pub credentials: Credentials,
}

/// Result of applying a validation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Draft is now validated.
    Validated,
    /// Remote check failed with this message.
    Failed(String),
    /// The draft changed after the call was issued; result ignored.
    Stale,
}

/// Result of applying a save response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved; the parent should refresh configuration and close the panel.
    Saved,
    /// Remote persist failed with this message.
    Failed(String),
    /// No save was in flight.
    Ignored,
}

/// Local gate failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Required fields are blank.
    #[error("missing required fields: {}", field_list(.0))]
    MissingFields(Vec<CredentialField>),
    /// Save attempted without a validation since the last edit.
    #[error("credentials must be validated before saving")]
    NotValidated,
    /// Fields are locked while demo mode is active.
    #[error("credential fields are locked while demo mode is active")]
    FieldsLocked,
    /// A validation or save call is already in flight.
    #[error("a settings request is already in progress")]
    Busy,
    /// Public URL base is not an http(s) URL.
    #[error("invalid public url base: {0}")]
    InvalidPublicUrl(String),
}

fn field_list(fields: &[CredentialField]) -> String {
    fields
        .iter()
        .map(|field| field_label(*field))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human label for a credential field.
pub fn field_label(field: CredentialField) -> &'static str {
    match field {
        CredentialField::AccessKey => "access key",
        CredentialField::SecretKey => "secret key",
        CredentialField::BucketName => "bucket name",
        CredentialField::AccountId => "account id",
        CredentialField::PublicUrlBase => "public url base",
    }
}

/// Validates the public URL base used to build shared links.
///
/// # Errors
/// Returns [`SettingsError::InvalidPublicUrl`] when the value does not parse,
/// is not `http`/`https`, or has no host.
pub fn validate_public_url_base(value: &str) -> Result<(), SettingsError> {
    let parsed = Url::parse(value.trim())
        .map_err(|error| SettingsError::InvalidPublicUrl(error.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidPublicUrl(format!(
            "unsupported scheme {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(SettingsError::InvalidPublicUrl("missing host".to_string()));
    }
    Ok(())
}

/// Credential settings state machine.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    draft: Credentials,
    phase: SettingsPhase,
    revision: u64,
    error: Option<String>,
    demo_mode: bool,
}

impl SettingsManager {
    /// Creates an empty manager in `Editing`.
    pub fn new() -> Self {
        Self {
            draft: Credentials::default(),
            phase: SettingsPhase::Editing,
            revision: 0,
            error: None,
            demo_mode: false,
        }
    }

    /// Loads the panel. Saved credentials are presumed valid.
    ///
    /// While a validation or save is in flight only the demo-mode flag is
    /// refreshed; the draft and phase stay with the pending call.
    pub fn activate(&mut self, saved: Option<Credentials>, demo_mode: bool) {
        self.demo_mode = demo_mode;
        if self.is_busy() {
            debug!(phase = ?self.phase, "settings reload deferred to in-flight call");
            return;
        }

        self.revision += 1;
        self.error = None;
        match saved {
            Some(credentials) => {
                self.draft = credentials;
                self.phase = SettingsPhase::Validated;
            }
            None => {
                self.draft = Credentials::default();
                self.phase = SettingsPhase::Editing;
            }
        }
        debug!(phase = ?self.phase, demo_mode, "settings activated");
    }

    /// Current draft.
    pub fn draft(&self) -> &Credentials {
        &self.draft
    }

    /// Current phase.
    pub fn phase(&self) -> SettingsPhase {
        self.phase
    }

    /// Form error, kept until the next edit or retry.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when the draft is usable.
    pub fn is_validated(&self) -> bool {
        matches!(self.phase, SettingsPhase::Validated | SettingsPhase::Saving)
    }

    /// Returns `true` while demo mode locks the fields.
    pub fn fields_locked(&self) -> bool {
        self.demo_mode
    }

    /// Reflects the demo-mode flag reported by configuration status.
    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.demo_mode = enabled;
    }

    /// Edits one field.
    ///
    /// Edits to account id, bucket name, or either key reset validation and
    /// clear the form error.
    ///
    /// # Errors
    /// Returns [`SettingsError::FieldsLocked`] in demo mode.
    pub fn edit(&mut self, field: CredentialField, value: impl Into<String>) -> Result<(), SettingsError> {
        if self.demo_mode {
            return Err(SettingsError::FieldsLocked);
        }

        self.draft.set(field, value);
        if VALIDATION_FIELDS.contains(&field) {
            self.revision += 1;
            self.error = None;
            self.phase = SettingsPhase::Editing;
        }
        Ok(())
    }

    /// Starts a validation call.
    ///
    /// # Errors
    /// Returns [`SettingsError::FieldsLocked`] in demo mode,
    /// [`SettingsError::Busy`] while another call is in flight, and
    /// [`SettingsError::MissingFields`] when a required field is blank.
    pub fn begin_validation(&mut self) -> Result<ValidationTicket, SettingsError> {
        self.ensure_idle()?;

        let missing = self.draft.blank_fields(&VALIDATION_FIELDS);
        if !missing.is_empty() {
            return Err(self.fail(SettingsError::MissingFields(missing)));
        }

        self.error = None;
        self.phase = SettingsPhase::Validating;
        Ok(ValidationTicket {
            revision: self.revision,
            credentials: self.draft.clone(),
        })
    }

    /// Applies a validation response.
    pub fn finish_validation(
        &mut self,
        revision: u64,
        result: Result<(), impl fmt::Display>,
    ) -> ValidationOutcome {
        if revision != self.revision || self.phase != SettingsPhase::Validating {
            debug!(revision, current = self.revision, "stale validation result ignored");
            return ValidationOutcome::Stale;
        }

        match result {
            Ok(()) => {
                info!(bucket = %self.draft.bucket_name, "credentials validated");
                self.phase = SettingsPhase::Validated;
                ValidationOutcome::Validated
            }
            Err(error) => {
                let message = error.to_string();
                warn!(error = %message, "credential validation failed");
                self.phase = SettingsPhase::Editing;
                self.error = Some(message.clone());
                ValidationOutcome::Failed(message)
            }
        }
    }

    /// Starts a save call and returns the credentials to persist.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingFields`] when any of the five fields is
    /// blank, [`SettingsError::NotValidated`] without a validation since the
    /// last edit, and [`SettingsError::InvalidPublicUrl`] for a bad link base.
    pub fn begin_save(&mut self) -> Result<Credentials, SettingsError> {
        self.ensure_idle()?;

        let missing = self.draft.blank_fields(&SAVE_FIELDS);
        if !missing.is_empty() {
            return Err(self.fail(SettingsError::MissingFields(missing)));
        }
        if self.phase != SettingsPhase::Validated {
            return Err(self.fail(SettingsError::NotValidated));
        }
        if let Err(error) = validate_public_url_base(&self.draft.public_url_base) {
            return Err(self.fail(error));
        }

        self.error = None;
        self.phase = SettingsPhase::Saving;
        Ok(self.draft.clone())
    }

    /// Applies a save response.
    pub fn finish_save(&mut self, result: Result<(), impl fmt::Display>) -> SaveOutcome {
        if self.phase != SettingsPhase::Saving {
            return SaveOutcome::Ignored;
        }

        self.phase = SettingsPhase::Validated;
        match result {
            Ok(()) => {
                info!(bucket = %self.draft.bucket_name, "credentials saved");
                SaveOutcome::Saved
            }
            Err(error) => {
                let message = error.to_string();
                warn!(error = %message, "credential save failed");
                self.error = Some(message.clone());
                SaveOutcome::Failed(message)
            }
        }
    }

    /// Resets the draft after saved credentials were cleared remotely.
    pub fn clear(&mut self) {
        self.revision += 1;
        self.draft = Credentials::default();
        self.phase = SettingsPhase::Editing;
        self.error = None;
    }

    fn ensure_idle(&mut self) -> Result<(), SettingsError> {
        if self.demo_mode {
            return Err(SettingsError::FieldsLocked);
        }
        if self.is_busy() {
            return Err(SettingsError::Busy);
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        matches!(self.phase, SettingsPhase::Validating | SettingsPhase::Saving)
    }

    fn fail(&mut self, error: SettingsError) -> SettingsError {
        self.error = Some(error.to_string());
        error
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for URL policy and phase gates.

    use super::*;

    #[test]
    fn validates_public_url_policy() {
        validate_public_url_base("https://pub-123.r2.dev").expect("https should pass");
        validate_public_url_base("http://cdn.example.test/base/").expect("http should pass");
        assert!(validate_public_url_base("ftp://cdn.example.test").is_err());
        assert!(validate_public_url_base("not a url").is_err());
    }

    #[test]
    fn saved_credentials_are_presumed_valid() {
        let mut manager = SettingsManager::new();
        manager.activate(
            Some(Credentials {
                access_key: "a".to_string(),
                secret_key: "s".to_string(),
                bucket_name: "b".to_string(),
                account_id: "acc".to_string(),
                public_url_base: "https://cdn.example.test".to_string(),
            }),
            false,
        );
        assert!(manager.is_validated());
        assert!(manager.begin_save().is_ok());
    }

    #[test]
    fn public_url_edit_keeps_validation() {
        let mut manager = SettingsManager::new();
        manager.activate(None, false);
        for field in VALIDATION_FIELDS {
            manager.edit(field, "x").expect("edit");
        }
        let ticket = manager.begin_validation().expect("validation should start");
        manager.finish_validation(ticket.revision, Ok::<(), String>(()));

        manager
            .edit(CredentialField::PublicUrlBase, "https://cdn.example.test")
            .expect("edit");
        assert!(manager.is_validated());
    }
}
