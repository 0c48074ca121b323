//! Core domain models for updr
//!
//! - Direct dependency entries and PEP 508 declaration parsing
//! - Outdated package records and frozen versions reported by pip

mod dependency;
mod package;

pub use dependency::{normalize_name, Declaration, DependencyEntry, DirectDependencies};
pub use package::{FrozenVersions, OutdatedPackage};
