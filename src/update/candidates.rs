//! Candidate selection: outdated packages that are also direct dependencies

use crate::domain::{DirectDependencies, OutdatedPackage};

/// Outdated direct dependencies, in the order the package manager reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    packages: Vec<OutdatedPackage>,
}

impl CandidateSet {
    /// Returns true if the package (any casing) is a candidate
    pub fn contains(&self, name: &str) -> bool {
        let key = crate::domain::normalize_name(name);
        self.packages.iter().any(|p| p.key() == key)
    }

    /// Package names to hand to the upgrade command
    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutdatedPackage> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Intersect the outdated packages with the direct dependencies
pub fn select_candidates(
    outdated: Vec<OutdatedPackage>,
    dependencies: &DirectDependencies,
) -> CandidateSet {
    let mut candidates = CandidateSet::default();
    for package in outdated {
        let key = package.key();
        if !dependencies.contains(&key) {
            continue;
        }
        // pip never reports a package twice, but a merged listing might
        if candidates.contains(&key) {
            continue;
        }
        log::debug!("Candidate {}", package);
        candidates.packages.push(package);
    }
    candidates
}
