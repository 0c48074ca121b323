//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: reading, parsing and writing manifest files
//! - PipError: failures of the package manager collaborator
//! - AppError: everything that can end a run, including conflicts, terminal
//!   IO and the post-upgrade write failure

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package manager related errors raised before anything was upgraded
    #[error(transparent)]
    Pip(#[from] PipError),

    /// Both requirements file and pyproject.toml declare dependencies
    #[error(
        "multiple dependency sources detected: {requirements} and {pyproject} both declare \
         dependencies; only one source can be upgraded at a time"
    )]
    Conflict {
        requirements: PathBuf,
        pyproject: PathBuf,
    },

    /// Writing user-facing output failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Reading the confirmation answer failed
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),

    /// Packages were upgraded but the manifest could not be repinned
    #[error("packages were upgraded but {path} was not updated: {message}")]
    Write { path: PathBuf, message: String },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// A directory was given instead of a file
    #[error("path is a directory, not a file: {path}; provide a dependency file such as requirements.txt")]
    IsDirectory { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed requirements line
    #[error("failed to parse {path} at line {line}: {message}")]
    RequirementsParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// TOML parsing error (for pyproject.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// A .toml file that is not pyproject.toml
    #[error("invalid toml file name: {path}; the file must be named pyproject.toml (PEP 621)")]
    InvalidTomlName { path: PathBuf },

    /// Unsupported manifest format
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Errors raised by the package manager collaborator
#[derive(Error, Debug)]
pub enum PipError {
    /// Listing outdated packages failed or produced unparseable output
    #[error("failed to query outdated packages: {message}")]
    QueryError { message: String },

    /// A pip command could not be run or exited non-zero
    #[error("command failed: {command}: {message}")]
    CommandError { command: String, message: String },
}

impl AppError {
    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Write {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if the environment was already modified when this error occurred
    pub fn is_post_upgrade(&self) -> bool {
        matches!(self, AppError::Write { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_post_upgrade() {
            2
        } else {
            1
        }
    }
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new RequirementsParseError
    pub fn requirements_parse_error(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::RequirementsParseError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl PipError {
    /// Creates a new QueryError
    pub fn query(message: impl Into<String>) -> Self {
        PipError::QueryError {
            message: message.into(),
        }
    }

    /// Creates a new CommandError
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        PipError::CommandError {
            command: command.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/requirements.txt");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("requirements.txt"));
    }

    #[test]
    fn test_manifest_error_requirements_parse() {
        let err = ManifestError::requirements_parse_error("requirements.txt", 3, "bad line");
        let msg = format!("{}", err);
        assert!(msg.contains("line 3"));
        assert!(msg.contains("bad line"));
    }

    #[test]
    fn test_manifest_error_toml_parse() {
        let err = ManifestError::toml_parse_error("/path/to/pyproject.toml", "invalid key");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse TOML"));
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn test_manifest_error_invalid_toml_name() {
        let err = ManifestError::InvalidTomlName {
            path: PathBuf::from("deps.toml"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("pyproject.toml"));
    }

    #[test]
    fn test_pip_error_query() {
        let err = PipError::query("expected JSON array");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to query outdated packages"));
        assert!(msg.contains("expected JSON array"));
    }

    #[test]
    fn test_pip_error_command() {
        let err = PipError::command("python3 -m pip install", "exit status: 1");
        let msg = format!("{}", err);
        assert!(msg.contains("python3 -m pip install"));
        assert!(msg.contains("exit status: 1"));
    }

    #[test]
    fn test_conflict_message() {
        let err = AppError::Conflict {
            requirements: PathBuf::from("requirements.txt"),
            pyproject: PathBuf::from("pyproject.toml"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("multiple dependency sources"));
        assert!(msg.contains("only one source"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_write_error_states_upgrade_happened() {
        let err = AppError::write("requirements.txt", "permission denied");
        let msg = format!("{}", err);
        assert!(msg.contains("packages were upgraded"));
        assert!(msg.contains("requirements.txt was not updated"));
        assert!(err.is_post_upgrade());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(format!("{}", app_err).contains("manifest file not found"));
        assert!(!app_err.is_post_upgrade());
        assert_eq!(app_err.exit_code(), 1);
    }

    #[test]
    fn test_app_error_from_pip_error() {
        let app_err: AppError = PipError::query("boom").into();
        assert!(format!("{}", app_err).contains("boom"));
        assert_eq!(app_err.exit_code(), 1);
    }
}
