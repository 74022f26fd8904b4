//! Shared fixtures for session integration tests.

use zipdrop_core::ProcessOutcome;

/// Successful outcome as reported by the remote side.
#[allow(dead_code)]
pub fn outcome(file_type: &str, is_demo: bool) -> ProcessOutcome {
    let name = format!("result.{file_type}");
    ProcessOutcome {
        url: if is_demo {
            format!("file:///Users/me/Downloads/ZipDrop/{name}")
        } else {
            format!("https://cdn.example.test/u/{name}")
        },
        local_path: is_demo.then(|| format!("/Users/me/Downloads/ZipDrop/{name}")),
        storage_key: (!is_demo).then(|| format!("u/{name}")),
        original_size: 10_000,
        processed_size: 4_096,
        file_type: file_type.to_string(),
        is_demo,
    }
}

/// Owned path list.
#[allow(dead_code)]
pub fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
