//! Shared fixtures for history integration tests.

use zipdrop_core::UploadRecord;

/// Cloud-backed record created at `created_at`.
#[allow(dead_code)]
pub fn cloud_record(created_at: u64) -> UploadRecord {
    UploadRecord {
        id: format!("{created_at}-cloud"),
        display_name: format!("file-{created_at}.webp"),
        human_size: "1.0 KB".to_string(),
        url: format!("https://cdn.example.test/u/{created_at}.webp"),
        local_path: None,
        storage_key: Some(format!("u/{created_at}.webp")),
        is_local_only: false,
        created_at,
    }
}

/// Demo-mode record created at `created_at`.
#[allow(dead_code)]
pub fn local_record(created_at: u64) -> UploadRecord {
    UploadRecord {
        id: format!("{created_at}-local"),
        display_name: format!("file-{created_at}.zip"),
        human_size: "2.0 KB".to_string(),
        url: format!("file:///tmp/{created_at}.zip"),
        local_path: Some(format!("/tmp/{created_at}.zip")),
        storage_key: None,
        is_local_only: true,
        created_at,
    }
}
