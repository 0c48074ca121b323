//! Manifest file detection, parsing and repinning
//!
//! This module provides functionality to:
//! - Detect the manifest format (requirements list or pyproject.toml)
//! - Check for a conflicting pyproject.toml next to a requirements file
//! - Extract direct dependencies
//! - Repin upgraded packages while preserving everything else

mod detector;
mod pyproject_toml;
mod requirements_txt;
mod writer;

pub use detector::{
    check_conflicting_sources, declares_dependencies, detect_kind, sibling_pyproject,
    ManifestKind, PYPROJECT_FILENAME,
};
pub use pyproject_toml::PyprojectToml;
pub use requirements_txt::RequirementsTxt;
pub use writer::{read_manifest, write_manifest, RepinReport, Repinned};

use crate::domain::{DirectDependencies, FrozenVersions};
use crate::error::ManifestError;
use crate::update::CandidateSet;
use std::path::{Path, PathBuf};

/// Parsed manifest document in one of the supported formats
#[derive(Debug, Clone)]
pub enum ManifestDocument {
    Requirements(RequirementsTxt),
    Pyproject(PyprojectToml),
}

/// A manifest file loaded from disk
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: ManifestDocument,
}

impl Manifest {
    /// Parse manifest content of a known kind
    pub fn parse(
        path: impl Into<PathBuf>,
        kind: ManifestKind,
        content: &str,
    ) -> Result<Self, ManifestError> {
        let path = path.into();
        let document = match kind {
            ManifestKind::Requirements => {
                ManifestDocument::Requirements(RequirementsTxt::parse(content, &path)?)
            }
            ManifestKind::Pyproject => {
                ManifestDocument::Pyproject(PyprojectToml::parse(content, &path)?)
            }
        };
        Ok(Self { path, document })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path, kind: ManifestKind) -> Result<Self, ManifestError> {
        let content = read_manifest(path)?;
        let manifest = Self::parse(path, kind, &content)?;
        log::debug!("Loaded {} as {}", path.display(), kind.display_name());
        Ok(manifest)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direct dependencies declared by the manifest.
    ///
    /// Returns None for a pyproject.toml without `[project].dependencies`;
    /// a requirements file always yields a (possibly empty) set.
    pub fn dependencies(&self) -> Result<Option<DirectDependencies>, ManifestError> {
        match &self.document {
            ManifestDocument::Requirements(doc) => Ok(Some(doc.dependencies())),
            ManifestDocument::Pyproject(doc) => doc.dependencies(),
        }
    }

    /// Pin every candidate to its frozen version. Non-candidate entries are untouched.
    pub fn repin(&mut self, candidates: &CandidateSet, frozen: &FrozenVersions) -> RepinReport {
        let mut report = RepinReport::new(&self.path);

        for candidate in candidates.iter() {
            let package = candidate.key();
            let Some(version) = frozen.get(&package) else {
                log::warn!("{} is missing from pip freeze output; keeping its declaration", package);
                report.missing.push(package);
                continue;
            };

            let changed = match &mut self.document {
                ManifestDocument::Requirements(doc) => doc.repin(&package, version),
                ManifestDocument::Pyproject(doc) => doc.repin(&package, version),
            };
            for (old, new) in changed {
                log::debug!("Repinned {} -> {}", old, new);
                report.repinned.push(Repinned {
                    package: package.clone(),
                    old,
                    new,
                });
            }
        }

        report
    }

    /// Render the manifest in its original format
    pub fn render(&self) -> String {
        match &self.document {
            ManifestDocument::Requirements(doc) => doc.render(),
            ManifestDocument::Pyproject(doc) => doc.render(),
        }
    }

    /// Write the manifest back to its original path
    pub fn save(&self) -> Result<(), ManifestError> {
        write_manifest(&self.path, &self.render())
    }
}
