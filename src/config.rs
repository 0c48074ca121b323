//! Runtime configuration for the pip collaborator
//!
//! The interpreter is resolved once in `main` from the CLI flag and the
//! `VIRTUAL_ENV` variable, then handed to the package manager explicitly.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Interpreter used when nothing else is configured
#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// Configuration for invoking `python -m pip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipConfig {
    /// Python interpreter that owns the environment being upgraded
    pub python: PathBuf,
}

impl PipConfig {
    /// Create a configuration for a specific interpreter
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Resolve the interpreter: explicit flag, then the active virtualenv,
    /// then the platform default.
    pub fn resolve(python: Option<&Path>, virtual_env: Option<OsString>) -> Self {
        if let Some(python) = python {
            return Self::new(python);
        }

        if let Some(venv) = virtual_env.filter(|v| !v.is_empty()) {
            return Self::new(venv_python(Path::new(&venv)));
        }

        Self::default()
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

#[cfg(windows)]
fn venv_python(venv: &Path) -> PathBuf {
    venv.join("Scripts").join("python.exe")
}

#[cfg(not(windows))]
fn venv_python(venv: &Path) -> PathBuf {
    venv.join("bin").join("python")
}
