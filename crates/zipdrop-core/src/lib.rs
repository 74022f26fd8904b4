#![warn(missing_docs)]
//! # zipdrop-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `zipdrop` workspace.
//!
//! ## Responsibilities
//! - Validate dropped file batches against count and extension policy.
//! - Represent upload records, remote processing outcomes, configuration
//!   status, and cloud credentials.
//! - Derive display names, human-readable sizes, and record identifiers.
//!
//! ## Data flow
//! Intake forwards raw paths to [`validate_batch`]. Accepted batches are
//! processed remotely into a [`ProcessOutcome`], which the session controller
//! turns into an [`UploadRecord`] via [`UploadRecord::from_outcome`].
//!
//! ## Ownership and lifetimes
//! Records and outcomes own their strings so they can cross the async remote
//! boundary and be persisted without borrowing transient event payloads.
//!
//! ## Error model
//! Batch policy violations return [`ValidationError`]. They are produced
//! synchronously and never reach the remote boundary.
//!
//! ## Security and privacy notes
//! [`Credentials`] redacts both keys from its `Debug` output so credential
//! drafts can appear in structured logs safely.
//!
//! ## Example
//! ```rust
//! use zipdrop_core::{validate_batch, ValidationError};
//!
//! assert!(validate_batch(&["/tmp/photo.jpg"]).is_ok());
//! assert!(matches!(
//!     validate_batch(&["/tmp/malware.exe"]),
//!     Err(ValidationError::UnsupportedType { .. })
//! ));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Maximum number of files accepted in one drop batch.
pub const MAX_BATCH_FILES: usize = 50;

/// Display name used for multi-file batches, which are packed into one archive.
pub const ARCHIVE_DISPLAY_NAME: &str = "archive.zip";

/// Lowercase extensions accepted by [`validate_batch`].
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif", "avif", "svg",
    "ico",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "md", "odt", "ods",
    "odp",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar",
    // video
    "mov", "mp4", "avi", "mkv", "webm", "m4v",
    // audio
    "mp3", "wav", "aac", "flac", "m4a", "ogg",
    // code and data
    "json", "xml", "html", "css", "js", "ts", "py", "rs", "go", "swift", "yaml", "yml", "toml",
    "ini", "sh", "sql",
    // fonts
    "ttf", "otf", "woff", "woff2",
    // installers and bundles
    "dmg", "pkg", "app", "plist",
];

/// Batch policy violations detected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Drop carried no paths.
    #[error("no files were dropped")]
    EmptyBatch,
    /// Drop carried more paths than the batch limit.
    #[error("too many files: maximum is {max}")]
    TooManyFiles {
        /// Configured batch limit.
        max: usize,
    },
    /// A file's extension is outside the allow-list.
    #[error("unsupported file type .{extension} ({file_name})")]
    UnsupportedType {
        /// Lowercased offending extension, without the dot.
        extension: String,
        /// Base name of the offending file.
        file_name: String,
    },
}

/// Validates one dropped batch.
///
/// Rules are applied in order: emptiness, batch size, then per-file extension
/// policy. The extension check short-circuits on the first offender; files
/// without an extension are exempt.
///
/// # Errors
/// Returns the first [`ValidationError`] encountered.
pub fn validate_batch<S: AsRef<str>>(paths: &[S]) -> Result<(), ValidationError> {
    if paths.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    if paths.len() > MAX_BATCH_FILES {
        return Err(ValidationError::TooManyFiles {
            max: MAX_BATCH_FILES,
        });
    }

    for path in paths {
        let name = file_name(path.as_ref());
        if let Some(extension) = extension_of(name)
            && !extension.is_empty()
            && !ALLOWED_EXTENSIONS.contains(&extension.as_str())
        {
            return Err(ValidationError::UnsupportedType {
                extension,
                file_name: name.to_string(),
            });
        }
    }

    Ok(())
}

/// Returns the final path component, accepting both `/` and `\` separators.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

/// Returns the lowercased extension of a file name.
///
/// `None` means the name has no extension: no dot at all, or a leading dot
/// only (`.env`). A trailing dot yields `Some("")`.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Derives the display name for a successfully processed batch.
///
/// Multi-file batches are always packed, so they get [`ARCHIVE_DISPLAY_NAME`].
/// A single file keeps its base name with the extension reported by the remote
/// operation substituted in.
pub fn success_display_name<S: AsRef<str>>(paths: &[S], file_type: &str) -> String {
    if paths.len() > 1 {
        return ARCHIVE_DISPLAY_NAME.to_string();
    }

    let name = paths
        .first()
        .map(|path| file_name(path.as_ref()))
        .unwrap_or_default();
    let file_type = file_type.trim().trim_start_matches('.');
    if file_type.is_empty() {
        return name.to_string();
    }

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    format!("{stem}.{file_type}")
}

/// Formats a byte count for display (`512 B`, `1.5 KB`, `2.0 MB`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Derives a record id from its creation time and a short digest of its link.
pub fn record_id(created_at_ms: u64, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{created_at_ms}-{}", &digest[..8])
}

/// Result returned by the remote process-and-upload operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    /// Shareable link, or a `file://` link in demo mode.
    pub url: String,
    /// Local output path when the result was saved locally.
    pub local_path: Option<String>,
    /// Object key when the result was uploaded to cloud storage.
    pub storage_key: Option<String>,
    /// Total input size in bytes.
    pub original_size: u64,
    /// Output size in bytes after processing.
    pub processed_size: u64,
    /// Extension of the produced file (`webp`, `zip`, ...).
    pub file_type: String,
    /// `true` when the remote side ran in demo mode.
    pub is_demo: bool,
}

/// One completed upload kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Unique id derived from creation time.
    pub id: String,
    /// Name shown in history.
    pub display_name: String,
    /// Processed size formatted for display.
    pub human_size: String,
    /// Link to the uploaded or locally saved result.
    pub url: String,
    /// Local output path for demo-mode results.
    #[serde(default)]
    pub local_path: Option<String>,
    /// Cloud object key for uploaded results.
    #[serde(default)]
    pub storage_key: Option<String>,
    /// `true` when the result never left the machine.
    pub is_local_only: bool,
    /// Creation time in Unix epoch milliseconds.
    pub created_at: u64,
}

impl UploadRecord {
    /// Builds a record from a successful remote outcome.
    pub fn from_outcome(
        display_name: impl Into<String>,
        outcome: &ProcessOutcome,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id: record_id(created_at_ms, &outcome.url),
            display_name: display_name.into(),
            human_size: human_size(outcome.processed_size),
            url: outcome.url.clone(),
            local_path: outcome.local_path.clone(),
            storage_key: outcome.storage_key.clone(),
            is_local_only: outcome.is_demo,
            created_at: created_at_ms,
        }
    }

    /// Returns the storage key when the record is backed by a cloud object.
    pub fn cloud_storage_key(&self) -> Option<&str> {
        if self.is_local_only {
            return None;
        }
        self.storage_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Server-side configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    /// Whether cloud credentials are stored.
    pub is_configured: bool,
    /// Whether uploads are saved locally instead of to the cloud.
    pub demo_mode: bool,
    /// Configured bucket, when any.
    #[serde(default)]
    pub bucket_name: Option<String>,
}

impl Default for ConfigStatus {
    fn default() -> Self {
        Self {
            is_configured: false,
            demo_mode: true,
            bucket_name: None,
        }
    }
}

/// Editable credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    /// Access key id.
    AccessKey,
    /// Secret access key.
    SecretKey,
    /// Bucket name.
    BucketName,
    /// Storage account id.
    AccountId,
    /// Public base URL for shared links.
    PublicUrlBase,
}

/// Cloud storage credential set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket name.
    pub bucket_name: String,
    /// Storage account id.
    pub account_id: String,
    /// Public base URL for shared links.
    pub public_url_base: String,
}

impl Credentials {
    /// Returns the value of one field.
    pub fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::AccessKey => &self.access_key,
            CredentialField::SecretKey => &self.secret_key,
            CredentialField::BucketName => &self.bucket_name,
            CredentialField::AccountId => &self.account_id,
            CredentialField::PublicUrlBase => &self.public_url_base,
        }
    }

    /// Replaces the value of one field.
    pub fn set(&mut self, field: CredentialField, value: impl Into<String>) {
        let slot = match field {
            CredentialField::AccessKey => &mut self.access_key,
            CredentialField::SecretKey => &mut self.secret_key,
            CredentialField::BucketName => &mut self.bucket_name,
            CredentialField::AccountId => &mut self.account_id,
            CredentialField::PublicUrlBase => &mut self.public_url_base,
        };
        *slot = value.into();
    }

    /// Returns the listed fields that are blank.
    pub fn blank_fields(&self, fields: &[CredentialField]) -> Vec<CredentialField> {
        fields
            .iter()
            .copied()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("account_id", &self.account_id)
            .field("public_url_base", &self.public_url_base)
            .finish()
    }
}
