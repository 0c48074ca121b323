//! Manifest format detection and conflicting-source check
//!
//! - Decides between requirements-style and pyproject.toml by file name
//! - Rejects `.toml` files that are not `pyproject.toml`
//! - Blocks a requirements file when a sibling pyproject.toml declares dependencies

use crate::error::{AppError, ManifestError};
use crate::manifest::read_manifest;
use std::path::{Path, PathBuf};
use toml::Table;

/// File name of the structured manifest
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Line-based requirements list
    Requirements,
    /// PEP 621 pyproject.toml
    Pyproject,
}

impl ManifestKind {
    /// Returns the display name for this format
    pub fn display_name(&self) -> &'static str {
        match self {
            ManifestKind::Requirements => "requirements",
            ManifestKind::Pyproject => "pyproject.toml [project.dependencies]",
        }
    }
}

/// Detect the manifest format from the file name
pub fn detect_kind(path: &Path) -> Result<ManifestKind, ManifestError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ManifestError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

    if file_name == PYPROJECT_FILENAME {
        return Ok(ManifestKind::Pyproject);
    }

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension {
        "toml" => Err(ManifestError::InvalidTomlName {
            path: path.to_path_buf(),
        }),
        "txt" | "in" => Ok(ManifestKind::Requirements),
        _ if file_name.starts_with("requirements") => Ok(ManifestKind::Requirements),
        _ => Err(ManifestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Path of the pyproject.toml sitting next to a requirements file
pub fn sibling_pyproject(requirements_path: &Path) -> PathBuf {
    requirements_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(PYPROJECT_FILENAME)
}

/// Returns true if the pyproject.toml content declares a non-empty `[project].dependencies`
pub fn declares_dependencies(content: &str, path: &Path) -> Result<bool, ManifestError> {
    let toml: Table = toml::from_str(content)
        .map_err(|e| ManifestError::toml_parse_error(path, e.to_string()))?;

    Ok(toml
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|deps| !deps.is_empty())
        .unwrap_or(false))
}

/// Fail with a conflict if a sibling pyproject.toml also declares dependencies
///
/// Only requirements input is checked; a pyproject.toml input is never
/// blocked by a requirements file next to it.
pub fn check_conflicting_sources(requirements_path: &Path) -> Result<(), AppError> {
    let pyproject = sibling_pyproject(requirements_path);
    if !pyproject.is_file() {
        return Ok(());
    }

    let content = read_manifest(&pyproject)?;
    if declares_dependencies(&content, &pyproject)? {
        return Err(AppError::Conflict {
            requirements: requirements_path.to_path_buf(),
            pyproject,
        });
    }

    log::debug!(
        "{} has no [project.dependencies]; using {}",
        pyproject.display(),
        requirements_path.display()
    );
    Ok(())
}
