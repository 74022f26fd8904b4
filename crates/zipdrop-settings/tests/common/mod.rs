//! Shared fixtures for settings integration tests.

#![allow(dead_code)]

use zipdrop_core::Credentials;
use zipdrop_settings::{SettingsManager, VALIDATION_FIELDS};

/// Fully populated credential set with a valid public URL base.
pub fn full_credentials() -> Credentials {
    Credentials {
        access_key: "AKIA-TEST".to_string(),
        secret_key: "secret-test".to_string(),
        bucket_name: "drops".to_string(),
        account_id: "acc-123".to_string(),
        public_url_base: "https://pub-123.r2.dev".to_string(),
    }
}

/// Manager with every validation field filled but not yet validated.
pub fn filled_manager() -> SettingsManager {
    let mut manager = SettingsManager::new();
    manager.activate(None, false);
    let credentials = full_credentials();
    for field in VALIDATION_FIELDS {
        manager
            .edit(field, credentials.get(field))
            .expect("edit should be allowed outside demo mode");
    }
    manager
        .edit(
            zipdrop_core::CredentialField::PublicUrlBase,
            credentials.public_url_base.clone(),
        )
        .expect("edit should be allowed outside demo mode");
    manager
}

/// Manager whose draft passed validation.
pub fn validated_manager() -> SettingsManager {
    let mut manager = filled_manager();
    let ticket = manager
        .begin_validation()
        .expect("validation should start");
    manager.finish_validation(ticket.revision, Ok::<(), String>(()));
    manager
}
