//! pyproject.toml document (PEP 621 `[project].dependencies`)
//!
//! Backed by a toml_edit document so comments, key order and array layout
//! survive a rewrite; only the strings of repinned entries are replaced.

use crate::domain::{normalize_name, Declaration, DependencyEntry, DirectDependencies};
use crate::error::ManifestError;
use std::path::{Path, PathBuf};
use toml_edit::{Array, DocumentMut, Value};

/// Parsed pyproject.toml
#[derive(Debug, Clone)]
pub struct PyprojectToml {
    path: PathBuf,
    document: DocumentMut,
}

impl PyprojectToml {
    /// Parse pyproject.toml content. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let document = content
            .parse::<DocumentMut>()
            .map_err(|e| ManifestError::toml_parse_error(path, e.to_string()))?;

        let pyproject = Self {
            path: path.to_path_buf(),
            document,
        };
        // Surface a malformed dependency array at load time
        pyproject.dependencies()?;
        Ok(pyproject)
    }

    fn dependency_array(&self) -> Result<Option<&Array>, ManifestError> {
        let Some(item) = self
            .document
            .get("project")
            .and_then(|project| project.get("dependencies"))
        else {
            return Ok(None);
        };

        item.as_array().map(Some).ok_or_else(|| {
            ManifestError::toml_parse_error(&self.path, "[project].dependencies must be an array")
        })
    }

    /// Direct dependencies, or None when `[project].dependencies` is absent
    pub fn dependencies(&self) -> Result<Option<DirectDependencies>, ManifestError> {
        let Some(array) = self.dependency_array()? else {
            return Ok(None);
        };

        let mut deps = DirectDependencies::new();
        for value in array.iter() {
            let dep_str = value.as_str().ok_or_else(|| {
                ManifestError::toml_parse_error(
                    &self.path,
                    "[project].dependencies must contain only strings",
                )
            })?;
            let declaration = Declaration::parse(dep_str).ok_or_else(|| {
                ManifestError::toml_parse_error(
                    &self.path,
                    format!("invalid dependency specifier '{}'", dep_str),
                )
            })?;
            deps.insert(DependencyEntry::new(declaration.name, dep_str));
        }

        Ok(Some(deps))
    }

    /// Replace every entry declaring `package` with `==version`, keeping the
    /// surrounding whitespace and comments of the array element.
    /// Returns the (old, new) declarations that changed.
    pub fn repin(&mut self, package: &str, version: &str) -> Vec<(String, String)> {
        let key = normalize_name(package);
        let mut changed = Vec::new();

        let Some(array) = self
            .document
            .get_mut("project")
            .and_then(|project| project.get_mut("dependencies"))
            .and_then(|deps| deps.as_array_mut())
        else {
            return changed;
        };

        for value in array.iter_mut() {
            let Some(old) = value.as_str().map(str::to_string) else {
                continue;
            };
            let Some(declaration) = Declaration::parse(&old) else {
                continue;
            };
            if declaration.normalized_name() != key {
                continue;
            }

            let new = declaration.pinned(version);
            if new == old {
                continue;
            }

            let decor = value.decor().clone();
            *value = Value::from(new.clone());
            *value.decor_mut() = decor;
            changed.push((old, new));
        }

        changed
    }

    /// Render the document back to text
    pub fn render(&self) -> String {
        self.document.to_string()
    }
}
