//! Integration tests for the save gate.

mod common;

use zipdrop_core::{CredentialField, Credentials};
use zipdrop_remote::RemoteError;
use zipdrop_settings::{SaveOutcome, SettingsError, SettingsManager, SettingsPhase};

#[test]
fn save_gate_tests_reports_missing_fields() {
    let mut manager = SettingsManager::new();
    manager.activate(None, false);
    manager
        .edit(CredentialField::AccountId, "acc-123")
        .expect("edit should be allowed");

    let error = manager.begin_save().expect_err("blank fields must block save");
    assert_eq!(
        error,
        SettingsError::MissingFields(vec![
            CredentialField::BucketName,
            CredentialField::AccessKey,
            CredentialField::SecretKey,
            CredentialField::PublicUrlBase,
        ])
    );
    assert!(manager.error().is_some_and(|message| message.contains("bucket name")));
}

#[test]
fn save_gate_tests_validation_skips_public_url() {
    let mut manager = SettingsManager::new();
    manager.activate(None, false);
    let credentials = common::full_credentials();
    for field in zipdrop_settings::VALIDATION_FIELDS {
        manager
            .edit(field, credentials.get(field))
            .expect("edit should be allowed");
    }

    assert!(manager.begin_validation().is_ok());
}

#[test]
fn save_gate_tests_rejects_non_http_public_url() {
    let mut manager = common::validated_manager();
    manager
        .edit(CredentialField::PublicUrlBase, "ftp://files.example.test")
        .expect("edit should be allowed");

    assert!(matches!(
        manager.begin_save(),
        Err(SettingsError::InvalidPublicUrl(_))
    ));
}

#[test]
fn save_gate_tests_success_hands_back_draft() {
    let mut manager = common::validated_manager();

    let saved = manager.begin_save().expect("save should start");
    assert_eq!(saved, common::full_credentials());
    assert_eq!(manager.phase(), SettingsPhase::Saving);

    assert_eq!(manager.finish_save(Ok::<(), RemoteError>(())), SaveOutcome::Saved);
    assert_eq!(manager.phase(), SettingsPhase::Validated);
}

#[test]
fn save_gate_tests_failure_keeps_validation() {
    let mut manager = common::validated_manager();
    manager.begin_save().expect("save should start");

    let outcome = manager.finish_save(Err::<(), _>(RemoteError::new("keychain locked")));
    assert_eq!(outcome, SaveOutcome::Failed("keychain locked".to_string()));
    assert!(manager.is_validated());
    assert_eq!(manager.error(), Some("keychain locked"));
}

#[test]
fn save_gate_tests_clear_returns_to_empty_draft() {
    let mut manager = SettingsManager::new();
    manager.activate(Some(common::full_credentials()), false);

    manager.clear();
    assert_eq!(manager.draft(), &Credentials::default());
    assert_eq!(manager.phase(), SettingsPhase::Editing);
    assert_eq!(manager.finish_save(Ok::<(), RemoteError>(())), SaveOutcome::Ignored);
}

#[test]
fn save_gate_tests_reload_during_save_keeps_pending_call() {
    let mut manager = common::validated_manager();
    let sent = manager.begin_save().expect("validated draft should save");

    manager.activate(Some(common::full_credentials()), false);
    assert_eq!(manager.phase(), SettingsPhase::Saving);
    assert_eq!(manager.draft(), &sent);

    assert_eq!(manager.finish_save(Ok::<(), RemoteError>(())), SaveOutcome::Saved);
    assert_eq!(manager.phase(), SettingsPhase::Validated);
}
