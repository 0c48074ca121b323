//! Installed package records reported by the package manager

use super::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An installed package that has a newer release available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
    /// Package name as reported by the package manager
    pub name: String,
    /// Currently installed version
    pub version: String,
    /// Latest available version
    pub latest_version: String,
}

impl OutdatedPackage {
    /// Creates a new outdated package record
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            latest_version: latest_version.into(),
        }
    }

    /// Normalized name used for matching against direct dependencies
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for OutdatedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.key(), self.version, self.latest_version)
    }
}

/// Exact installed versions keyed by normalized package name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenVersions {
    versions: HashMap<String, String>,
}

impl FrozenVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the installed version of a package
    pub fn insert(&mut self, name: &str, version: impl Into<String>) {
        self.versions.insert(normalize_name(name), version.into());
    }

    /// Installed version of a package, matched case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.versions.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
