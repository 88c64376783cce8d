//! Backup export inspection.
//!
//! Reads a JSON backup export and summarizes it as a [`BackupOverview`]:
//! which projects were exported, under what build, and a SHA-256 digest of
//! the file so two exports can be compared without re-reading them.
//! Problems are reported through an
//! [`ErrorCollection`](crate::messages::ErrorCollection) keyed by the
//! `backup-path` field, with a missing file, an unreadable file, and a
//! malformed file each producing its own message.

use crate::error::{Error, Result};
use crate::messages::ErrorCollection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Field key used for all backup path problems.
pub const BACKUP_PATH_FIELD: &str = "backup-path";

/// One project as recorded in a backup export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupProject {
    /// Stable numeric project id.
    pub id: u64,

    /// Short uppercase project key, e.g. `PROJ`.
    pub key: String,

    /// Display name.
    pub name: String,

    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ids of the issues exported with this project.
    #[serde(default)]
    pub issue_ids: Vec<u64>,
}

impl BackupProject {
    /// Number of issues exported with this project.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issue_ids.len()
    }
}

/// Build metadata recorded in a backup export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSystemInformation {
    /// Build number of the exporting application.
    pub build_number: u64,

    /// Edition of the exporting application.
    pub edition: String,
}

/// The raw shape of a backup export file.
#[derive(Debug, Deserialize)]
struct BackupFile {
    system_information: BackupSystemInformation,
    #[serde(default)]
    projects: Vec<BackupProject>,
}

/// Summary of a backup export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupOverview {
    /// Build metadata from the export.
    pub system_information: BackupSystemInformation,

    /// Exported projects, in file order.
    pub projects: Vec<BackupProject>,

    /// Hex-encoded SHA-256 digest of the backup file contents.
    pub digest: String,
}

impl BackupOverview {
    /// Total issue count across all exported projects.
    #[must_use]
    pub fn total_issues(&self) -> usize {
        self.projects.iter().map(BackupProject::issue_count).sum()
    }

    /// Looks up an exported project by its key.
    #[must_use]
    pub fn project_by_key(&self, key: &str) -> Option<&BackupProject> {
        self.projects.iter().find(|p| p.key == key)
    }
}

/// Checks that a backup path points at a readable file, without opening it.
///
/// Returns an empty collection when the path looks usable. A missing path
/// and a directory each produce a distinct message under
/// [`BACKUP_PATH_FIELD`].
#[must_use]
pub fn validate_backup_path(path: &Path) -> ErrorCollection {
    let mut errors = ErrorCollection::new();
    if !path.exists() {
        errors.add_error(
            BACKUP_PATH_FIELD,
            format!("backup file '{}' does not exist", path.display()),
        );
    } else if path.is_dir() {
        errors.add_error(
            BACKUP_PATH_FIELD,
            format!("backup path '{}' is a directory, not a file", path.display()),
        );
    }
    errors
}

/// Loads and summarizes a backup export.
///
/// On failure the returned collection carries exactly one message under
/// [`BACKUP_PATH_FIELD`] saying whether the file was missing, unreadable,
/// or not valid JSON.
///
/// # Errors
///
/// This function never returns `Err`; problems land in the
/// `ErrorCollection` arm so callers can surface them field-by-field.
pub async fn load_backup_overview(
    path: &Path,
) -> std::result::Result<BackupOverview, ErrorCollection> {
    let mut errors = validate_backup_path(path);
    if errors.has_any_errors() {
        return Err(errors);
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) => {
            errors.add_error(
                BACKUP_PATH_FIELD,
                format!("backup file '{}' could not be read: {error}", path.display()),
            );
            return Err(errors);
        }
    };

    let file: BackupFile = match serde_json::from_slice(&bytes) {
        Ok(file) => file,
        Err(error) => {
            errors.add_error(
                BACKUP_PATH_FIELD,
                format!(
                    "backup file '{}' is not a valid backup export: {error}",
                    path.display()
                ),
            );
            return Err(errors);
        }
    };

    Ok(BackupOverview {
        system_information: file.system_information,
        projects: file.projects,
        digest: hex_digest(&bytes),
    })
}

/// Convenience wrapper turning validation messages into a crate error.
///
/// # Errors
///
/// Fails with [`Error::Backup`] carrying the first path message when the
/// file cannot be loaded.
pub async fn inspect_backup(path: &Path) -> Result<BackupOverview> {
    load_backup_overview(path).await.map_err(|errors| {
        let message = errors
            .field_error(BACKUP_PATH_FIELD)
            .unwrap_or("backup file could not be loaded")
            .to_string();
        Error::Backup(message)
    })
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
        out
    })
}
