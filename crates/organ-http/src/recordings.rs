//! Recordings directory access.
//!
//! Enumerates the configured directory and applies delete/rename requests
//! after checking that every name refers to a direct child of it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use actix_web::HttpResponse;
use actix_web::http::header;

/// One directory entry as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Entry name, without any directory part.
    pub name: String,
    /// Size in bytes (0 when metadata is unavailable).
    pub size_bytes: u64,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Errors raised while mutating the recordings directory.
#[derive(Debug)]
pub enum RecordingError {
    /// A submitted name is empty, `.`/`..`, or contains a separator.
    InvalidName { field: &'static str, value: String },
    /// A rename would overwrite an existing entry.
    TargetExists { path: PathBuf },
    /// The filesystem call itself failed.
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::InvalidName { field, value } => {
                write!(f, "invalid recording name in {field}: {value:?}")
            }
            RecordingError::TargetExists { path } => {
                write!(f, "rename target already exists: {}", path.display())
            }
            RecordingError::Io {
                action,
                path,
                source,
            } => write!(f, "{action} {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordingError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl RecordingError {
    /// Convert a mutation error into an HTTP response.
    ///
    /// Only rejected names are reported to the client; filesystem failures
    /// still redirect back to the dashboard.
    pub fn into_response(self) -> HttpResponse {
        match self {
            RecordingError::InvalidName { .. } => {
                HttpResponse::BadRequest().body("invalid recording name")
            }
            RecordingError::TargetExists { .. } | RecordingError::Io { .. } => redirect_home(),
        }
    }
}

/// `303 See Other` back to the dashboard.
pub fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Check that `value` names a direct child of the recordings directory.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), RecordingError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(RecordingError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// List the recordings directory, newest first.
pub fn list_recordings(dir: &Path) -> std::io::Result<Vec<Recording>> {
    let mut recordings = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        // Links and forms must carry the exact entry name, so names that are
        // not UTF-8 cannot be offered.
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 entry name");
                continue;
            }
        };
        let (size_bytes, modified) = match entry.metadata() {
            Ok(meta) => (meta.len(), meta.modified().ok()),
            Err(err) => {
                tracing::debug!(name = %name, error = %err, "metadata unavailable");
                (0, None)
            }
        };
        recordings.push(Recording {
            name,
            size_bytes,
            modified,
        });
    }

    // `None` sorts below any timestamp, so entries without one end up last.
    recordings.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(recordings)
}

/// Remove `<dir>/<name>`.
pub fn delete_recording(dir: &Path, name: &str) -> Result<PathBuf, RecordingError> {
    validate_name("deleterecording", name)?;
    let path = dir.join(name);
    std::fs::remove_file(&path).map_err(|source| RecordingError::Io {
        action: "remove",
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Rename `<dir>/<from>` to `<dir>/<to>`, refusing to replace an existing entry.
pub fn rename_recording(dir: &Path, from: &str, to: &str) -> Result<PathBuf, RecordingError> {
    validate_name("renamerecording", from)?;
    validate_name("newname", to)?;
    let source = dir.join(from);
    let target = dir.join(to);
    if from == to {
        return Ok(target);
    }
    if std::fs::symlink_metadata(&target).is_ok() {
        return Err(RecordingError::TargetExists { path: target });
    }
    std::fs::rename(&source, &target).map_err(|err| RecordingError::Io {
        action: "rename",
        path: source.clone(),
        source: err,
    })?;
    Ok(target)
}
