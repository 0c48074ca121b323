//! Direct dependency entries and PEP 508 declaration handling

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// name, optional [extras], version specifier, optional ;marker
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(\[[^\]]*\])?\s*([^;]*?)\s*(?:;\s*(.*?))?\s*$",
    )
    .unwrap()
});

static SEPARATOR_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a package name (PEP 503): lowercase, runs of `-_.` become `-`
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN_RE
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

/// A dependency declaration split into its PEP 508 parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    /// Package name as written
    pub name: &'a str,
    /// Extras including brackets, e.g. `[security]`
    pub extras: Option<&'a str>,
    /// Version specifier as written, e.g. `==2.0.0` or `>=1,<2`
    pub specifier: &'a str,
    /// Environment marker without the leading `;`
    pub marker: Option<&'a str>,
}

impl<'a> Declaration<'a> {
    /// Split a declaration string. Returns None if it does not start with a valid name.
    pub fn parse(declaration: &'a str) -> Option<Self> {
        let caps = DECLARATION_RE.captures(declaration.trim())?;
        Some(Self {
            name: caps.get(1)?.as_str(),
            extras: caps.get(2).map(|m| m.as_str()),
            specifier: caps.get(3).map(|m| m.as_str()).unwrap_or(""),
            marker: caps.get(4).map(|m| m.as_str()).filter(|m| !m.is_empty()),
        })
    }

    /// Normalized package name
    pub fn normalized_name(&self) -> String {
        normalize_name(self.name)
    }

    /// Same declaration with the specifier replaced by an exact pin
    pub fn pinned(&self, version: &str) -> String {
        let mut pinned = format!("{}{}=={}", self.name, self.extras.unwrap_or(""), version);
        if let Some(marker) = self.marker {
            pinned.push_str("; ");
            pinned.push_str(marker);
        }
        pinned
    }
}

/// A direct dependency declared by the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    /// Normalized package name (unique key)
    pub name: String,
    /// Original declaration string
    pub declaration: String,
}

impl DependencyEntry {
    /// Creates a new entry, normalizing the name
    pub fn new(name: &str, declaration: impl Into<String>) -> Self {
        Self {
            name: normalize_name(name),
            declaration: declaration.into(),
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.declaration)
    }
}

/// Ordered mapping of normalized name to declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectDependencies {
    entries: Vec<DependencyEntry>,
}

impl DirectDependencies {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A later declaration of the same package replaces the
    /// earlier one but keeps its position.
    pub fn insert(&mut self, entry: DependencyEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up an entry by (any casing of) its name
    pub fn get(&self, name: &str) -> Option<&DependencyEntry> {
        let key = normalize_name(name);
        self.entries.iter().find(|e| e.name == key)
    }

    /// Returns true if the package is a direct dependency
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.entries.iter()
    }
}

impl FromIterator<DependencyEntry> for DirectDependencies {
    fn from_iter<I: IntoIterator<Item = DependencyEntry>>(iter: I) -> Self {
        let mut deps = DirectDependencies::new();
        for entry in iter {
            deps.insert(entry);
        }
        deps
    }
}
