//! Manifest file IO and repin bookkeeping
//!
//! - read_manifest / write_manifest wrap fs errors with the manifest path
//! - RepinReport records what a repin changed and what it could not pin

use crate::error::ManifestError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One declaration rewritten by a repin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repinned {
    /// Normalized package name
    pub package: String,
    /// Declaration before the repin
    pub old: String,
    /// Declaration after the repin
    pub new: String,
}

/// Result of repinning a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepinReport {
    /// Path of the manifest
    pub path: PathBuf,
    /// Declarations that changed
    pub repinned: Vec<Repinned>,
    /// Candidates with no installed version in the freeze output
    pub missing: Vec<String>,
    /// Whether the file was written
    pub file_modified: bool,
}

impl RepinReport {
    /// Create a new empty report
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Returns true if any declaration changed
    pub fn has_changes(&self) -> bool {
        !self.repinned.is_empty()
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file atomically.
///
/// The content goes to a temporary file in the same directory, which then
/// replaces the manifest by rename. The manifest's permissions are carried
/// over, and a symlinked manifest is replaced at its target.
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |e: io::Error| ManifestError::write_error(path, e);

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    if let Ok(metadata) = fs::metadata(&target) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }

    // Dropping an unpersisted temp file removes it
    temp.persist(&target).map_err(|e| write_error(e.error))?;
    Ok(())
}
